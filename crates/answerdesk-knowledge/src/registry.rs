// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-tenant index registry.
//!
//! Indexes are loaded from storage on first use and kept for the lifetime of
//! the registry. Every write goes to storage first; the in-memory index only
//! changes after the write succeeded.
//!
//! Loads and writes of one tenant are serialized by that tenant's gate, so a
//! storage read can never be published over a write that finished after it.
//! Readers only take the gate until the first load has completed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use answerdesk_core::{AnswerdeskError, KnowledgeEntry, StorageAdapter};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::entry::EntryDraft;
use crate::index::KnowledgeIndex;

/// One tenant's index plus the gate guarding its loads and writes.
struct TenantSlot {
    index: Arc<KnowledgeIndex>,
    gate: Mutex<()>,
    /// Set under `gate` once the index reflects storage.
    loaded: AtomicBool,
}

impl TenantSlot {
    fn new(chatbot_id: &str) -> Self {
        Self {
            index: Arc::new(KnowledgeIndex::new(chatbot_id)),
            gate: Mutex::new(()),
            loaded: AtomicBool::new(false),
        }
    }

    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Re-read storage into the index. Caller holds `gate`.
    async fn load_locked(&self, storage: &dyn StorageAdapter) -> Result<usize, AnswerdeskError> {
        let count = self.index.load(storage).await?;
        self.loaded.store(true, Ordering::Release);
        Ok(count)
    }
}

/// Owns one [`KnowledgeIndex`] per tenant.
pub struct KnowledgeRegistry {
    storage: Arc<dyn StorageAdapter>,
    slots: DashMap<String, Arc<TenantSlot>>,
}

impl KnowledgeRegistry {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self {
            storage,
            slots: DashMap::new(),
        }
    }

    fn slot(&self, chatbot_id: &str) -> Arc<TenantSlot> {
        // Clone out so the map shard is not held across an await.
        self.slots
            .entry(chatbot_id.to_string())
            .or_insert_with(|| Arc::new(TenantSlot::new(chatbot_id)))
            .clone()
    }

    /// The tenant's index, loading it from storage if this is the first use.
    pub async fn index_for(&self, chatbot_id: &str) -> Result<Arc<KnowledgeIndex>, AnswerdeskError> {
        let slot = self.slot(chatbot_id);
        if !slot.is_loaded() {
            let _gate = slot.gate.lock().await;
            if !slot.is_loaded() {
                slot.load_locked(self.storage.as_ref()).await?;
            }
        }
        Ok(Arc::clone(&slot.index))
    }

    /// Persist a new entry, then make it visible in the tenant's index.
    pub async fn add_entry(&self, entry: KnowledgeEntry) -> Result<Arc<KnowledgeEntry>, AnswerdeskError> {
        let Some(chatbot_id) = entry.chatbot_id.clone() else {
            return Err(AnswerdeskError::Input("knowledge entry has no chatbot".into()));
        };
        let slot = self.slot(&chatbot_id);
        let _gate = slot.gate.lock().await;

        let stored = self.storage.insert_entry(&entry).await?;
        debug!(chatbot_id = %chatbot_id, entry_id = %stored.id, "knowledge entry stored");

        if slot.is_loaded() {
            slot.index.insert(stored)
        } else {
            // Not loaded yet: the first load runs after this write and reads it.
            Ok(Arc::new(stored))
        }
    }

    /// Validate and add a batch of drafts for one tenant. Stops at the first failure.
    pub async fn import(
        &self,
        chatbot_id: &str,
        drafts: Vec<EntryDraft>,
    ) -> Result<usize, AnswerdeskError> {
        let entries = drafts
            .into_iter()
            .map(|d| d.into_entry(chatbot_id))
            .collect::<Result<Vec<_>, _>>()?;
        let count = entries.len();
        for entry in entries {
            self.add_entry(entry).await?;
        }
        info!(chatbot_id, count, "knowledge entries imported");
        Ok(count)
    }

    /// Delete an entry, then reload the tenant's index. Returns whether it existed.
    pub async fn remove_entry(&self, chatbot_id: &str, entry_id: &str) -> Result<bool, AnswerdeskError> {
        let slot = self.slot(chatbot_id);
        let _gate = slot.gate.lock().await;
        let removed = self.storage.delete_entry(chatbot_id, entry_id).await?;
        if removed && slot.is_loaded() {
            slot.load_locked(self.storage.as_ref()).await?;
        }
        Ok(removed)
    }

    /// Re-read the tenant's entries from storage. Returns the indexed count.
    pub async fn reload(&self, chatbot_id: &str) -> Result<usize, AnswerdeskError> {
        let slot = self.slot(chatbot_id);
        let _gate = slot.gate.lock().await;
        slot.load_locked(self.storage.as_ref()).await
    }

    /// Forget the tenant's index; the next lookup reloads it.
    pub fn invalidate(&self, chatbot_id: &str) {
        self.slots.remove(chatbot_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use answerdesk_config::model::StorageConfig;
    use answerdesk_core::Chatbot;
    use answerdesk_storage::{Database, SqliteStorage};

    async fn setup() -> (Arc<dyn StorageAdapter>, Chatbot) {
        let db = Database::open_in_memory().await.unwrap();
        let storage: Arc<dyn StorageAdapter> =
            Arc::new(SqliteStorage::from_database(StorageConfig::default(), db));
        let bot = Chatbot::new("Shop", Some("persona".into()));
        storage.create_chatbot(&bot).await.unwrap();
        (storage, bot)
    }

    fn draft(q: &str) -> EntryDraft {
        EntryDraft::new(q, "answer text")
    }

    #[tokio::test]
    async fn first_lookup_loads_from_storage() {
        let (storage, bot) = setup().await;
        storage
            .insert_entry(&draft("Opening hours?").into_entry(&bot.id).unwrap())
            .await
            .unwrap();

        let registry = KnowledgeRegistry::new(storage);
        let index = registry.index_for(&bot.id).await.unwrap();
        assert_eq!(index.len(), 1);
        assert!(Arc::ptr_eq(&index, &registry.index_for(&bot.id).await.unwrap()));
    }

    #[tokio::test]
    async fn add_entry_updates_loaded_index_once() {
        let (storage, bot) = setup().await;
        let registry = KnowledgeRegistry::new(Arc::clone(&storage));
        let index = registry.index_for(&bot.id).await.unwrap();

        registry
            .add_entry(draft("Refund policy?").into_entry(&bot.id).unwrap())
            .await
            .unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(storage.load_entries_for_tenant(&bot.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn add_before_first_lookup_is_not_duplicated() {
        let (storage, bot) = setup().await;
        let registry = KnowledgeRegistry::new(storage);
        registry
            .add_entry(draft("Refund policy?").into_entry(&bot.id).unwrap())
            .await
            .unwrap();
        assert_eq!(registry.index_for(&bot.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_store_write_leaves_index_untouched() {
        let (storage, bot) = setup().await;
        let registry = KnowledgeRegistry::new(storage);
        let index = registry.index_for(&bot.id).await.unwrap();

        // Unknown tenant violates the foreign key.
        let orphan = draft("Refund policy?").into_entry("ghost").unwrap();
        assert!(registry.add_entry(orphan).await.is_err());
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn remove_entry_reloads_index() {
        let (storage, bot) = setup().await;
        let registry = KnowledgeRegistry::new(storage);
        let stored = registry
            .add_entry(draft("Refund policy?").into_entry(&bot.id).unwrap())
            .await
            .unwrap();
        let index = registry.index_for(&bot.id).await.unwrap();
        assert_eq!(index.len(), 1);

        assert!(registry.remove_entry(&bot.id, &stored.id).await.unwrap());
        assert!(index.is_empty());
        assert!(!registry.remove_entry(&bot.id, &stored.id).await.unwrap());
    }

    #[tokio::test]
    async fn reload_picks_up_external_writes() {
        let (storage, bot) = setup().await;
        let registry = KnowledgeRegistry::new(Arc::clone(&storage));
        let index = registry.index_for(&bot.id).await.unwrap();

        storage
            .insert_entry(&draft("Opening hours?").into_entry(&bot.id).unwrap())
            .await
            .unwrap();
        assert!(index.is_empty());
        assert_eq!(registry.reload(&bot.id).await.unwrap(), 1);
        assert_eq!(index.len(), 1);
    }

    #[tokio::test]
    async fn import_rejects_whole_batch_on_invalid_draft() {
        let (storage, bot) = setup().await;
        let registry = KnowledgeRegistry::new(Arc::clone(&storage));
        let result = registry
            .import(&bot.id, vec![draft("Valid?"), EntryDraft::new("", "no question")])
            .await;
        assert!(matches!(result, Err(AnswerdeskError::Input(_))));
        assert!(storage.load_entries_for_tenant(&bot.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalidate_forces_fresh_index() {
        let (storage, bot) = setup().await;
        let registry = KnowledgeRegistry::new(storage);
        let first = registry.index_for(&bot.id).await.unwrap();
        registry.invalidate(&bot.id);
        let second = registry.index_for(&bot.id).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }
}
