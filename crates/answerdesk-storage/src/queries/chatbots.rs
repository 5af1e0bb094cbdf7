// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chatbot (tenant) CRUD operations.

use answerdesk_core::{AnswerdeskError, Chatbot};
use rusqlite::{params, OptionalExtension};

use crate::database::Database;

/// Create a new chatbot.
pub async fn create_chatbot(db: &Database, chatbot: &Chatbot) -> Result<(), AnswerdeskError> {
    let chatbot = chatbot.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO chatbots (id, name, system_prompt, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    chatbot.id,
                    chatbot.name,
                    chatbot.system_prompt,
                    chatbot.created_at
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a chatbot by ID.
pub async fn get_chatbot(db: &Database, id: &str) -> Result<Option<Chatbot>, AnswerdeskError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, name, system_prompt, created_at FROM chatbots WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Chatbot {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        system_prompt: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List all chatbots, oldest first.
pub async fn list_chatbots(db: &Database) -> Result<Vec<Chatbot>, AnswerdeskError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, system_prompt, created_at FROM chatbots
                 ORDER BY created_at ASC, rowid ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(Chatbot {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    system_prompt: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_and_get_chatbot_roundtrips() {
        let db = Database::open_in_memory().await.unwrap();
        let bot = Chatbot::new("Coffee Shop", Some("You are Bob.".into()));
        create_chatbot(&db, &bot).await.unwrap();

        let loaded = get_chatbot(&db, &bot.id).await.unwrap().unwrap();
        assert_eq!(loaded, bot);
    }

    #[tokio::test]
    async fn missing_chatbot_is_none() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(get_chatbot(&db, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let db = Database::open_in_memory().await.unwrap();
        let bot = Chatbot::new("A", None);
        create_chatbot(&db, &bot).await.unwrap();
        assert!(create_chatbot(&db, &bot).await.is_err());
    }

    #[tokio::test]
    async fn list_returns_all_in_creation_order() {
        let db = Database::open_in_memory().await.unwrap();
        let a = Chatbot::new("A", None);
        let b = Chatbot::new("B", None);
        create_chatbot(&db, &a).await.unwrap();
        create_chatbot(&db, &b).await.unwrap();
        let names: Vec<String> = list_chatbots(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
