// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete orchestrator with a mock provider,
//! storage (temp SQLite by default), one chatbot and one open session.
//! `ask()` drives the full resolve pipeline.

use std::sync::Arc;
use std::time::Duration;

use answerdesk_agent::{ProviderGateway, ResponseOrchestrator};
use answerdesk_config::model::StorageConfig;
use answerdesk_core::{
    AnswerdeskError, Chatbot, Message, ResolvedAnswer, Session, StorageAdapter,
};
use answerdesk_knowledge::EntryDraft;
use answerdesk_storage::SqliteStorage;

use crate::memory_storage::MemoryStorage;
use crate::mock_provider::MockProvider;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    persona: Option<String>,
    entries: Vec<EntryDraft>,
    in_memory: bool,
    provider_delay: Option<Duration>,
    timeout: Duration,
    forward_history: Option<usize>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            persona: Some("You are a test assistant.".to_string()),
            entries: Vec::new(),
            in_memory: false,
            provider_delay: None,
            timeout: Duration::from_secs(2),
            forward_history: None,
        }
    }

    /// Set mock provider replies.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    /// Set the chatbot persona. `None` leaves onboarding unfinished.
    pub fn with_persona(mut self, persona: Option<&str>) -> Self {
        self.persona = persona.map(str::to_string);
        self
    }

    /// Seed the chatbot's knowledge.
    pub fn with_entry(mut self, draft: EntryDraft) -> Self {
        self.entries.push(draft);
        self
    }

    /// Use [`MemoryStorage`] instead of a temp SQLite file.
    pub fn in_memory(mut self) -> Self {
        self.in_memory = true;
        self
    }

    /// Make every provider call take `delay`, against a gateway deadline of `timeout`.
    pub fn with_slow_provider(mut self, delay: Duration, timeout: Duration) -> Self {
        self.provider_delay = Some(delay);
        self.timeout = timeout;
        self
    }

    /// Forward up to `window` prior turns to the provider.
    pub fn with_forward_history(mut self, window: usize) -> Self {
        self.forward_history = Some(window);
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, AnswerdeskError> {
        let mut temp_dir = None;
        let mut memory = None;
        let storage: Arc<dyn StorageAdapter> = if self.in_memory {
            let store = Arc::new(MemoryStorage::new());
            memory = Some(Arc::clone(&store));
            store
        } else {
            let dir = tempfile::TempDir::new()
                .map_err(|e| AnswerdeskError::Storage { source: e.into() })?;
            let storage_config = StorageConfig {
                database_path: dir.path().join("test.db").to_string_lossy().into_owned(),
                wal_mode: true,
            };
            temp_dir = Some(dir);
            let store = SqliteStorage::new(storage_config);
            store.initialize().await?;
            Arc::new(store)
        };

        let mut provider = if self.responses.is_empty() {
            MockProvider::new()
        } else {
            MockProvider::with_responses(self.responses)
        };
        if let Some(delay) = self.provider_delay {
            provider = provider.with_delay(delay);
        }
        let mock_provider = Arc::new(provider);

        let gateway = ProviderGateway::new(mock_provider.clone(), self.timeout, 6);
        let mut orchestrator = ResponseOrchestrator::new(Arc::clone(&storage), gateway);
        if let Some(window) = self.forward_history {
            orchestrator = orchestrator.with_forward_history(true, window);
        }

        let chatbot = orchestrator.create_chatbot("Test Shop", self.persona).await?;
        if !self.entries.is_empty() {
            orchestrator.knowledge().import(&chatbot.id, self.entries).await?;
        }
        let session = orchestrator.start_session(&chatbot.id, "test-user").await?;

        Ok(TestHarness {
            mock_provider,
            storage,
            memory,
            orchestrator: Arc::new(orchestrator),
            chatbot,
            session,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with a mock provider and throwaway storage.
pub struct TestHarness {
    /// The mock provider behind the gateway.
    pub mock_provider: Arc<MockProvider>,
    pub storage: Arc<dyn StorageAdapter>,
    /// Set when built with [`TestHarnessBuilder::in_memory`], for failure injection.
    pub memory: Option<Arc<MemoryStorage>>,
    pub orchestrator: Arc<ResponseOrchestrator>,
    pub chatbot: Chatbot,
    pub session: Session,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Resolve `text` in the harness session.
    pub async fn ask(&self, text: &str) -> Result<ResolvedAnswer, AnswerdeskError> {
        self.orchestrator
            .resolve(&self.chatbot.id, &self.session.id, text)
            .await
    }

    /// The harness session's full transcript.
    pub async fn transcript(&self) -> Result<Vec<Message>, AnswerdeskError> {
        self.orchestrator.transcript(&self.session.id, None).await
    }
}
