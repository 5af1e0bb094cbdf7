// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generative provider for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with scripted outcomes,
//! enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use answerdesk_core::{
    AdapterType, AnswerdeskError, GenerateRequest, GeneratedAnswer, HealthStatus, PluginAdapter,
    ProviderAdapter, ProviderError,
};

/// What the next `generate` call does.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Reply(String),
    Fail(ProviderError),
    /// Panics inside the provider call.
    Panic,
}

/// A mock provider that plays back scripted outcomes.
///
/// Outcomes are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned. Every request is recorded.
pub struct MockProvider {
    outcomes: Arc<Mutex<VecDeque<MockOutcome>>>,
    calls: Arc<Mutex<Vec<GenerateRequest>>>,
    delay: Option<Duration>,
}

impl MockProvider {
    /// Create a new mock provider with an empty queue.
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Create a mock provider pre-loaded with the given replies.
    pub fn with_responses(responses: Vec<String>) -> Self {
        let provider = Self::new();
        let queue = responses.into_iter().map(MockOutcome::Reply).collect();
        Self {
            outcomes: Arc::new(Mutex::new(queue)),
            ..provider
        }
    }

    /// Sleep this long before answering every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn push_reply(&self, text: impl Into<String>) {
        self.outcomes.lock().await.push_back(MockOutcome::Reply(text.into()));
    }

    pub async fn push_error(&self, error: ProviderError) {
        self.outcomes.lock().await.push_back(MockOutcome::Fail(error));
    }

    pub async fn push_panic(&self) {
        self.outcomes.lock().await.push_back(MockOutcome::Panic);
    }

    /// Requests received so far, oldest first.
    pub async fn calls(&self) -> Vec<GenerateRequest> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    async fn next_outcome(&self) -> MockOutcome {
        self.outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| MockOutcome::Reply("mock response".to_string()))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, AnswerdeskError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), AnswerdeskError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedAnswer, ProviderError> {
        self.calls.lock().await.push(request.clone());
        let outcome = self.next_outcome().await;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match outcome {
            MockOutcome::Reply(content) => Ok(GeneratedAnswer {
                content,
                model: "mock-model".to_string(),
            }),
            MockOutcome::Fail(err) => Err(err),
            MockOutcome::Panic => panic!("mock provider panicked"),
        }
    }
}
