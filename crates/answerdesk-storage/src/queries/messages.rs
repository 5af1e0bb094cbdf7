// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message CRUD operations.
//!
//! Transcript order is `created_at` ascending with insertion order as tie-break.

use std::str::FromStr;

use answerdesk_core::{AnswerdeskError, Message, ResponseSource, Role};
use rusqlite::params;

use crate::database::Database;
use crate::queries::conversion_error;

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let role: String = row.get(2)?;
    let source: Option<String> = row.get(4)?;
    Ok(Message {
        id: row.get(0)?,
        session_id: row.get(1)?,
        role: Role::from_str(&role).map_err(|e| conversion_error(2, e))?,
        content: row.get(3)?,
        response_source: source
            .map(|s| ResponseSource::from_str(&s))
            .transpose()
            .map_err(|e| conversion_error(4, e))?,
        metadata: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Insert a new message.
pub async fn insert_message(db: &Database, msg: &Message) -> Result<(), AnswerdeskError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, session_id, role, content, response_source, metadata, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    msg.id,
                    msg.session_id,
                    msg.role.to_string(),
                    msg.content,
                    msg.response_source.map(|s| s.to_string()),
                    msg.metadata,
                    msg.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get messages for a session in transcript order.
///
/// With a `limit`, only the last `limit` messages are returned, still oldest first.
pub async fn get_messages_for_session(
    db: &Database,
    session_id: &str,
    limit: Option<i64>,
) -> Result<Vec<Message>, AnswerdeskError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let messages = match limit {
                Some(lim) => {
                    let mut stmt = conn.prepare(
                        "SELECT id, session_id, role, content, response_source, metadata, created_at
                         FROM (
                             SELECT *, rowid AS seq FROM messages WHERE session_id = ?1
                             ORDER BY created_at DESC, rowid DESC LIMIT ?2
                         )
                         ORDER BY created_at ASC, seq ASC",
                    )?;
                    let rows = stmt.query_map(params![session_id, lim], row_to_message)?;
                    rows.collect::<Result<Vec<_>, _>>()?
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT id, session_id, role, content, response_source, metadata, created_at
                         FROM messages WHERE session_id = ?1
                         ORDER BY created_at ASC, rowid ASC",
                    )?;
                    let rows = stmt.query_map(params![session_id], row_to_message)?;
                    rows.collect::<Result<Vec<_>, _>>()?
                }
            };
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::chatbots::create_chatbot;
    use crate::queries::sessions::create_session;
    use answerdesk_core::{Chatbot, Session};

    async fn setup_db_with_session() -> (Database, Session) {
        let db = Database::open_in_memory().await.unwrap();
        let bot = Chatbot::new("Shop", None);
        create_chatbot(&db, &bot).await.unwrap();
        let session = Session::new(&bot.id, "visitor");
        create_session(&db, &session).await.unwrap();
        (db, session)
    }

    fn at(mut msg: Message, created_at: &str) -> Message {
        msg.created_at = created_at.to_string();
        msg
    }

    #[tokio::test]
    async fn insert_and_get_messages() {
        let (db, session) = setup_db_with_session().await;
        let user = at(Message::user(&session.id, "hello"), "2026-01-01T00:00:01.000000Z");
        let reply = at(
            Message::assistant(&session.id, "hi there", ResponseSource::KnowledgeBase)
                .with_metadata(serde_json::json!({"score": 0.5})),
            "2026-01-01T00:00:02.000000Z",
        );
        insert_message(&db, &user).await.unwrap();
        insert_message(&db, &reply).await.unwrap();

        let messages = get_messages_for_session(&db, &session.id, None).await.unwrap();
        assert_eq!(messages, vec![user, reply]);
    }

    #[tokio::test]
    async fn messages_ordered_by_created_at() {
        let (db, session) = setup_db_with_session().await;
        let late = at(Message::user(&session.id, "late"), "2026-01-01T00:00:03.000000Z");
        let early = at(Message::user(&session.id, "early"), "2026-01-01T00:00:01.000000Z");
        insert_message(&db, &late).await.unwrap();
        insert_message(&db, &early).await.unwrap();

        let contents: Vec<String> = get_messages_for_session(&db, &session.id, None)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["early", "late"]);
    }

    #[tokio::test]
    async fn equal_timestamps_keep_insertion_order() {
        let (db, session) = setup_db_with_session().await;
        let ts = "2026-01-01T00:00:01.000000Z";
        for text in ["first", "second", "third"] {
            insert_message(&db, &at(Message::user(&session.id, text), ts))
                .await
                .unwrap();
        }
        let contents: Vec<String> = get_messages_for_session(&db, &session.id, None)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn limit_returns_trailing_window_in_order() {
        let (db, session) = setup_db_with_session().await;
        for i in 0..5 {
            let msg = at(
                Message::user(&session.id, format!("m{i}")),
                &format!("2026-01-01T00:00:0{i}.000000Z"),
            );
            insert_message(&db, &msg).await.unwrap();
        }

        let contents: Vec<String> = get_messages_for_session(&db, &session.id, Some(2))
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["m3", "m4"]);
    }

    #[tokio::test]
    async fn message_for_unknown_session_is_rejected() {
        let (db, _session) = setup_db_with_session().await;
        let orphan = Message::user("ghost", "hello");
        assert!(insert_message(&db, &orphan).await.is_err());
    }
}
