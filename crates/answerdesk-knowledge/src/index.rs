// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-tenant knowledge index.
//!
//! Readers take a snapshot with [`KnowledgeIndex::all`] and never block.
//! Reloads and inserts publish a new list atomically.

use std::sync::Arc;

use answerdesk_core::{AnswerdeskError, KnowledgeEntry, StorageAdapter};
use arc_swap::ArcSwap;
use tracing::debug;

/// The in-memory entry list of one tenant, newest first.
pub struct KnowledgeIndex {
    chatbot_id: String,
    entries: ArcSwap<Vec<Arc<KnowledgeEntry>>>,
}

impl KnowledgeIndex {
    /// An empty index for `chatbot_id`.
    pub fn new(chatbot_id: impl Into<String>) -> Self {
        Self {
            chatbot_id: chatbot_id.into(),
            entries: ArcSwap::from_pointee(Vec::new()),
        }
    }

    pub fn chatbot_id(&self) -> &str {
        &self.chatbot_id
    }

    /// Replace the contents with the tenant's entries from storage.
    ///
    /// Returns the number of entries now indexed.
    pub async fn load(&self, storage: &dyn StorageAdapter) -> Result<usize, AnswerdeskError> {
        let entries = storage.load_entries_for_tenant(&self.chatbot_id).await?;
        Ok(self.replace(entries))
    }

    /// Replace the contents with `entries`, dropping rows of other or no tenant.
    pub fn replace(&self, entries: Vec<KnowledgeEntry>) -> usize {
        let mut owned: Vec<Arc<KnowledgeEntry>> = entries
            .into_iter()
            .filter(|e| e.chatbot_id.as_deref() == Some(self.chatbot_id.as_str()))
            .map(Arc::new)
            .collect();
        // Stable: equal timestamps keep the storage order.
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let count = owned.len();
        self.entries.store(Arc::new(owned));
        debug!(chatbot_id = %self.chatbot_id, entries = count, "knowledge index loaded");
        count
    }

    /// Append an entry that has already been written to storage.
    pub fn insert(&self, entry: KnowledgeEntry) -> Result<Arc<KnowledgeEntry>, AnswerdeskError> {
        if entry.chatbot_id.as_deref() != Some(self.chatbot_id.as_str()) {
            return Err(AnswerdeskError::Input(format!(
                "entry {} does not belong to chatbot {}",
                entry.id, self.chatbot_id
            )));
        }
        let entry = Arc::new(entry);
        self.entries.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(Arc::clone(&entry));
            next
        });
        Ok(entry)
    }

    /// Current snapshot of all entries.
    pub fn all(&self) -> Arc<Vec<Arc<KnowledgeEntry>>> {
        self.entries.load_full()
    }

    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for KnowledgeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeIndex")
            .field("chatbot_id", &self.chatbot_id)
            .field("entries", &self.len())
            .finish()
    }
}
