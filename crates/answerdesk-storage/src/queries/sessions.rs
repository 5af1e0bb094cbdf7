// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session CRUD operations.

use answerdesk_core::{AnswerdeskError, Session};
use rusqlite::{params, OptionalExtension};

use crate::database::Database;

/// Create a new session.
pub async fn create_session(db: &Database, session: &Session) -> Result<(), AnswerdeskError> {
    let session = session.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO sessions (id, chatbot_id, user_identity, created_at, updated_at, is_active)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    session.id,
                    session.chatbot_id,
                    session.user_identity,
                    session.created_at,
                    session.updated_at,
                    session.is_active,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a session by ID.
pub async fn get_session(db: &Database, id: &str) -> Result<Option<Session>, AnswerdeskError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, chatbot_id, user_identity, created_at, updated_at, is_active
                 FROM sessions WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Session {
                        id: row.get(0)?,
                        chatbot_id: row.get(1)?,
                        user_identity: row.get(2)?,
                        created_at: row.get(3)?,
                        updated_at: row.get(4)?,
                        is_active: row.get(5)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark a session inactive. Returns whether the session exists.
pub async fn end_session(db: &Database, id: &str, ended_at: &str) -> Result<bool, AnswerdeskError> {
    let id = id.to_string();
    let ended_at = ended_at.to_string();
    db.connection()
        .call(move |conn| {
            let updated = conn.execute(
                "UPDATE sessions SET is_active = 0, updated_at = ?2 WHERE id = ?1",
                params![id, ended_at],
            )?;
            Ok(updated > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::chatbots::create_chatbot;
    use answerdesk_core::Chatbot;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, Chatbot, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        let bot = Chatbot::new("Shop", Some("persona".into()));
        create_chatbot(&db, &bot).await.unwrap();
        (db, bot, dir)
    }

    #[tokio::test]
    async fn create_and_get_session_roundtrips() {
        let (db, bot, _dir) = setup_db().await;
        let session = Session::new(&bot.id, "visitor-1");

        create_session(&db, &session).await.unwrap();
        let retrieved = get_session(&db, &session.id).await.unwrap().unwrap();
        assert_eq!(retrieved, session);
        assert!(retrieved.is_active);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_nonexistent_session_returns_none() {
        let (db, _bot, _dir) = setup_db().await;
        assert!(get_session(&db, "no-such-session").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn end_session_marks_inactive() {
        let (db, bot, _dir) = setup_db().await;
        let session = Session::new(&bot.id, "visitor-1");
        create_session(&db, &session).await.unwrap();

        assert!(end_session(&db, &session.id, "2030-01-01T00:00:00.000000Z").await.unwrap());
        let ended = get_session(&db, &session.id).await.unwrap().unwrap();
        assert!(!ended.is_active);
        assert_eq!(ended.updated_at, "2030-01-01T00:00:00.000000Z");

        assert!(!end_session(&db, "ghost", "2030-01-01T00:00:00.000000Z").await.unwrap());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn session_requires_existing_chatbot() {
        let (db, _bot, _dir) = setup_db().await;
        let session = Session::new("ghost-bot", "visitor");
        assert!(create_session(&db, &session).await.is_err());
        db.close().await.unwrap();
    }
}
