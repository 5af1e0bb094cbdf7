// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use answerdesk_config::model::StorageConfig;
use answerdesk_core::types::now_timestamp;
use answerdesk_core::{
    AdapterType, AnswerdeskError, Chatbot, HealthStatus, KnowledgeEntry, Message, PluginAdapter,
    Session, StorageAdapter,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is opened on the first call to
/// [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wrap an already-open database. The adapter counts as initialized.
    pub fn from_database(config: StorageConfig, db: Database) -> Self {
        Self {
            config,
            db: OnceCell::new_with(Some(db)),
        }
    }

    fn db(&self) -> Result<&Database, AnswerdeskError> {
        self.db
            .get()
            .ok_or_else(|| AnswerdeskError::storage("storage not initialized -- call initialize() first"))
    }

    /// All chatbots, oldest first.
    pub async fn list_chatbots(&self) -> Result<Vec<Chatbot>, AnswerdeskError> {
        queries::chatbots::list_chatbots(self.db()?).await
    }

    async fn checkpoint(db: &Database) -> Result<(), AnswerdeskError> {
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, AnswerdeskError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), AnswerdeskError> {
        if let Some(db) = self.db.get() {
            Self::checkpoint(db).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), AnswerdeskError> {
        let db = Database::open_with_options(&self.config.database_path, self.config.wal_mode)
            .await?;
        self.db
            .set(db)
            .map_err(|_| AnswerdeskError::storage("storage already initialized"))?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), AnswerdeskError> {
        Self::checkpoint(self.db()?).await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Chatbot operations ---

    async fn create_chatbot(&self, chatbot: &Chatbot) -> Result<(), AnswerdeskError> {
        queries::chatbots::create_chatbot(self.db()?, chatbot).await
    }

    async fn get_chatbot(&self, id: &str) -> Result<Option<Chatbot>, AnswerdeskError> {
        queries::chatbots::get_chatbot(self.db()?, id).await
    }

    // --- Knowledge operations ---

    async fn load_entries_for_tenant(
        &self,
        chatbot_id: &str,
    ) -> Result<Vec<KnowledgeEntry>, AnswerdeskError> {
        queries::knowledge::entries_for_chatbot(self.db()?, chatbot_id).await
    }

    async fn insert_entry(
        &self,
        entry: &KnowledgeEntry,
    ) -> Result<KnowledgeEntry, AnswerdeskError> {
        queries::knowledge::insert_entry(self.db()?, entry).await?;
        Ok(entry.clone())
    }

    async fn delete_entry(&self, chatbot_id: &str, entry_id: &str) -> Result<bool, AnswerdeskError> {
        queries::knowledge::delete_entry(self.db()?, chatbot_id, entry_id).await
    }

    // --- Session operations ---

    async fn create_session(&self, session: &Session) -> Result<(), AnswerdeskError> {
        queries::sessions::create_session(self.db()?, session).await
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>, AnswerdeskError> {
        queries::sessions::get_session(self.db()?, id).await
    }

    async fn end_session(&self, id: &str) -> Result<(), AnswerdeskError> {
        let found = queries::sessions::end_session(self.db()?, id, &now_timestamp()).await?;
        if found {
            Ok(())
        } else {
            Err(AnswerdeskError::not_found("session", id))
        }
    }

    // --- Message operations ---

    async fn insert_message(&self, message: &Message) -> Result<Message, AnswerdeskError> {
        queries::messages::insert_message(self.db()?, message).await?;
        Ok(message.clone())
    }

    async fn get_messages(
        &self,
        session_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, AnswerdeskError> {
        queries::messages::get_messages_for_session(self.db()?, session_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use answerdesk_core::{ResponseSource, Role};
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn sqlite_storage_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
        assert!(storage.initialize().await.is_err(), "second initialize should fail");
    }

    #[tokio::test]
    async fn health_check_reflects_initialization() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert!(storage.health_check().await.is_err());
        storage.initialize().await.unwrap();
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn full_conversation_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();

        let bot = Chatbot::new("Coffee Shop", Some("You are Bob.".into()));
        storage.create_chatbot(&bot).await.unwrap();
        assert_eq!(storage.get_chatbot(&bot.id).await.unwrap(), Some(bot.clone()));

        let session = Session::new(&bot.id, "visitor-1");
        storage.create_session(&session).await.unwrap();

        let user = Message::user(&session.id, "hello");
        let stored = storage.insert_message(&user).await.unwrap();
        assert_eq!(stored, user);
        let mut reply = Message::assistant(&session.id, "hi there", ResponseSource::Generative);
        reply.created_at = "2999-01-01T00:00:00.000000Z".to_string();
        storage.insert_message(&reply).await.unwrap();

        let messages = storage.get_messages(&session.id, None).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].response_source, Some(ResponseSource::Generative));

        storage.end_session(&session.id).await.unwrap();
        let ended = storage.get_session(&session.id).await.unwrap().unwrap();
        assert!(!ended.is_active);

        assert!(matches!(
            storage.end_session("ghost").await,
            Err(AnswerdeskError::NotFound { .. })
        ));

        storage.close().await.unwrap();
    }

    #[tokio::test]
    async fn from_database_is_ready_without_initialize() {
        let db = Database::open_in_memory().await.unwrap();
        let storage = SqliteStorage::from_database(make_config(":memory:"), db);
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
        assert!(storage.list_chatbots().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn shutdown_runs_checkpoint() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("shutdown.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();
        storage
            .create_chatbot(&Chatbot::new("Shop", None))
            .await
            .unwrap();
        storage.shutdown().await.unwrap();
    }
}
