// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory `StorageAdapter` with failure injection.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use answerdesk_core::types::now_timestamp;
use answerdesk_core::{
    AdapterType, AnswerdeskError, Chatbot, HealthStatus, KnowledgeEntry, Message, PluginAdapter,
    Role, Session, StorageAdapter,
};

#[derive(Default)]
struct State {
    chatbots: HashMap<String, Chatbot>,
    /// Insertion order.
    entries: Vec<KnowledgeEntry>,
    sessions: HashMap<String, Session>,
    /// Insertion order.
    messages: Vec<Message>,
}

/// Storage double that keeps everything in process memory.
///
/// Orders results the same way as the SQLite backend and can be told to
/// fail message writes (per role) or knowledge reads.
#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<State>,
    fail_writes_for: Mutex<Option<Role>>,
    fail_entry_reads: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `insert_message` fail for messages of `role`. `None` clears it.
    pub fn fail_message_writes(&self, role: Option<Role>) {
        if let Ok(mut slot) = self.fail_writes_for.lock() {
            *slot = role;
        }
    }

    /// Make `load_entries_for_tenant` fail.
    pub fn fail_entry_reads(&self, fail: bool) {
        self.fail_entry_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of stored messages across all sessions.
    pub fn message_count(&self) -> usize {
        self.state.lock().map(|s| s.messages.len()).unwrap_or(0)
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut State) -> T) -> Result<T, AnswerdeskError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| AnswerdeskError::storage("memory storage lock poisoned"))?;
        Ok(f(&mut state))
    }
}

#[async_trait]
impl PluginAdapter for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, AnswerdeskError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), AnswerdeskError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn initialize(&self) -> Result<(), AnswerdeskError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), AnswerdeskError> {
        Ok(())
    }

    async fn create_chatbot(&self, chatbot: &Chatbot) -> Result<(), AnswerdeskError> {
        self.with_state(|s| {
            s.chatbots.insert(chatbot.id.clone(), chatbot.clone());
        })
    }

    async fn get_chatbot(&self, id: &str) -> Result<Option<Chatbot>, AnswerdeskError> {
        self.with_state(|s| s.chatbots.get(id).cloned())
    }

    async fn load_entries_for_tenant(
        &self,
        chatbot_id: &str,
    ) -> Result<Vec<KnowledgeEntry>, AnswerdeskError> {
        if self.fail_entry_reads.load(Ordering::SeqCst) {
            return Err(AnswerdeskError::storage("injected knowledge read failure"));
        }
        self.with_state(|s| {
            let mut entries: Vec<KnowledgeEntry> = s
                .entries
                .iter()
                .rev()
                .filter(|e| e.chatbot_id.as_deref() == Some(chatbot_id))
                .cloned()
                .collect();
            // Stable: equal timestamps keep newest-inserted first.
            entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            entries
        })
    }

    async fn insert_entry(&self, entry: &KnowledgeEntry) -> Result<KnowledgeEntry, AnswerdeskError> {
        self.with_state(|s| {
            s.entries.push(entry.clone());
            entry.clone()
        })
    }

    async fn delete_entry(&self, chatbot_id: &str, entry_id: &str) -> Result<bool, AnswerdeskError> {
        self.with_state(|s| {
            let before = s.entries.len();
            s.entries
                .retain(|e| !(e.id == entry_id && e.chatbot_id.as_deref() == Some(chatbot_id)));
            s.entries.len() != before
        })
    }

    async fn create_session(&self, session: &Session) -> Result<(), AnswerdeskError> {
        self.with_state(|s| {
            s.sessions.insert(session.id.clone(), session.clone());
        })
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>, AnswerdeskError> {
        self.with_state(|s| s.sessions.get(id).cloned())
    }

    async fn end_session(&self, id: &str) -> Result<(), AnswerdeskError> {
        let found = self.with_state(|s| match s.sessions.get_mut(id) {
            Some(session) => {
                session.is_active = false;
                session.updated_at = now_timestamp();
                true
            }
            None => false,
        })?;
        if found {
            Ok(())
        } else {
            Err(AnswerdeskError::not_found("session", id))
        }
    }

    async fn insert_message(&self, message: &Message) -> Result<Message, AnswerdeskError> {
        let failing = self.fail_writes_for.lock().map(|r| *r).unwrap_or(None);
        if failing == Some(message.role) {
            return Err(AnswerdeskError::storage(format!(
                "injected {} message write failure",
                message.role
            )));
        }
        self.with_state(|s| {
            s.messages.push(message.clone());
            message.clone()
        })
    }

    async fn get_messages(
        &self,
        session_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, AnswerdeskError> {
        self.with_state(|s| {
            let mut messages: Vec<Message> = s
                .messages
                .iter()
                .filter(|m| m.session_id == session_id)
                .cloned()
                .collect();
            messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            if let Some(limit) = limit {
                let keep = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
                let skip = messages.len().saturating_sub(keep);
                messages.drain(..skip);
            }
            messages
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn messages_come_back_in_transcript_order_with_limit() {
        let storage = MemoryStorage::new();
        for text in ["one", "two", "three"] {
            storage.insert_message(&Message::user("s1", text)).await.unwrap();
        }
        storage.insert_message(&Message::user("s2", "other")).await.unwrap();

        let all = storage.get_messages("s1", None).await.unwrap();
        assert_eq!(all.len(), 3);
        let last_two: Vec<String> = storage
            .get_messages("s1", Some(2))
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(last_two, vec!["two", "three"]);
    }

    #[tokio::test]
    async fn write_failure_is_per_role() {
        let storage = MemoryStorage::new();
        storage.fail_message_writes(Some(Role::Assistant));

        assert!(storage.insert_message(&Message::user("s1", "hi")).await.is_ok());
        let err = storage
            .insert_message(&Message::assistant(
                "s1",
                "hello",
                answerdesk_core::ResponseSource::Generative,
            ))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(storage.message_count(), 1);
    }

    #[tokio::test]
    async fn end_unknown_session_is_not_found() {
        let storage = MemoryStorage::new();
        let err = storage.end_session("missing").await.unwrap_err();
        assert!(matches!(err, AnswerdeskError::NotFound { .. }));
    }
}
