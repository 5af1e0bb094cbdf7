// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge entry CRUD operations.
//!
//! Keywords are stored as a JSON array in a TEXT column.

use std::collections::BTreeSet;

use answerdesk_core::{AnswerdeskError, KnowledgeEntry};
use rusqlite::params;

use crate::database::Database;
use crate::queries::conversion_error;

const ENTRY_COLUMNS: &str = "id, chatbot_id, question, answer, category, subcategory, \
     keywords, source_document_id, metadata, created_at";

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<KnowledgeEntry> {
    let keywords_json: String = row.get(6)?;
    let keywords: BTreeSet<String> =
        serde_json::from_str(&keywords_json).map_err(|e| conversion_error(6, e))?;
    Ok(KnowledgeEntry {
        id: row.get(0)?,
        chatbot_id: row.get(1)?,
        question: row.get(2)?,
        answer: row.get(3)?,
        category: row.get(4)?,
        subcategory: row.get(5)?,
        keywords,
        source_document_id: row.get(7)?,
        metadata: row.get(8)?,
        created_at: row.get(9)?,
    })
}

/// Insert a knowledge entry.
pub async fn insert_entry(db: &Database, entry: &KnowledgeEntry) -> Result<(), AnswerdeskError> {
    let keywords = serde_json::to_string(&entry.keywords).map_err(|e| AnswerdeskError::Storage {
        source: Box::new(e),
    })?;
    let entry = entry.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO knowledge_entries ({ENTRY_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
                ),
                params![
                    entry.id,
                    entry.chatbot_id,
                    entry.question,
                    entry.answer,
                    entry.category,
                    entry.subcategory,
                    keywords,
                    entry.source_document_id,
                    entry.metadata,
                    entry.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All entries of one tenant, newest first.
pub async fn entries_for_chatbot(
    db: &Database,
    chatbot_id: &str,
) -> Result<Vec<KnowledgeEntry>, AnswerdeskError> {
    let chatbot_id = chatbot_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM knowledge_entries
                 WHERE chatbot_id = ?1
                 ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map(params![chatbot_id], row_to_entry)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete an entry owned by `chatbot_id`. Returns whether a row was removed.
pub async fn delete_entry(
    db: &Database,
    chatbot_id: &str,
    entry_id: &str,
) -> Result<bool, AnswerdeskError> {
    let chatbot_id = chatbot_id.to_string();
    let entry_id = entry_id.to_string();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM knowledge_entries WHERE id = ?1 AND chatbot_id = ?2",
                params![entry_id, chatbot_id],
            )?;
            Ok(removed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
