// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the relational datastore.

use async_trait::async_trait;

use crate::error::AnswerdeskError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Chatbot, KnowledgeEntry, Message, Session};

/// Persistence for tenants, knowledge, sessions, and transcripts.
///
/// Implementations must be read-after-write consistent within one process.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), AnswerdeskError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), AnswerdeskError>;

    // --- Chatbots ---

    async fn create_chatbot(&self, chatbot: &Chatbot) -> Result<(), AnswerdeskError>;

    async fn get_chatbot(&self, id: &str) -> Result<Option<Chatbot>, AnswerdeskError>;

    // --- Knowledge ---

    /// All entries for one tenant, newest first.
    async fn load_entries_for_tenant(
        &self,
        chatbot_id: &str,
    ) -> Result<Vec<KnowledgeEntry>, AnswerdeskError>;

    /// Persists a new entry and returns it as stored.
    async fn insert_entry(&self, entry: &KnowledgeEntry)
    -> Result<KnowledgeEntry, AnswerdeskError>;

    /// Deletes an entry of the given tenant. Returns whether a row was removed.
    async fn delete_entry(&self, chatbot_id: &str, entry_id: &str)
    -> Result<bool, AnswerdeskError>;

    // --- Sessions ---

    async fn create_session(&self, session: &Session) -> Result<(), AnswerdeskError>;

    async fn get_session(&self, id: &str) -> Result<Option<Session>, AnswerdeskError>;

    /// Marks a session inactive.
    async fn end_session(&self, id: &str) -> Result<(), AnswerdeskError>;

    // --- Messages ---

    /// Appends a message and returns it as stored.
    async fn insert_message(&self, message: &Message) -> Result<Message, AnswerdeskError>;

    /// Messages of a session in transcript order, optionally only the last `limit`.
    async fn get_messages(
        &self,
        session_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, AnswerdeskError>;
}
