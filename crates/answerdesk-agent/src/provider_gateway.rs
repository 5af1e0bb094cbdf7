// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The recovery boundary around a generative provider.
//!
//! Every call is bounded by a deadline and isolated in its own task, and the
//! typed outcome is normalised into a [`ProviderResponse`] whose content is
//! always presentable to the end user.

use std::sync::Arc;
use std::time::Duration;

use answerdesk_config::model::ProviderConfig;
use answerdesk_core::{ChatTurn, GenerateRequest, ProviderAdapter, ProviderError, ProviderResponse};
use tracing::{debug, warn};

/// Calls one configured provider with a deadline. Never returns an error.
#[derive(Clone)]
pub struct ProviderGateway {
    provider: Arc<dyn ProviderAdapter>,
    timeout: Duration,
    history_window: usize,
}

impl ProviderGateway {
    pub fn new(provider: Arc<dyn ProviderAdapter>, timeout: Duration, history_window: usize) -> Self {
        Self {
            provider,
            timeout,
            history_window,
        }
    }

    /// Gateway with the deadline and history window from `[provider]`.
    pub fn from_config(provider: Arc<dyn ProviderAdapter>, config: &ProviderConfig) -> Self {
        Self::new(
            provider,
            Duration::from_secs(config.timeout_secs),
            config.history_window,
        )
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Generate a reply for `user_message` under `persona`.
    ///
    /// A timeout, a panicking provider, and every typed provider failure come
    /// back as `succeeded == false` with a diagnostic sentence as content.
    pub async fn generate(
        &self,
        persona: &str,
        history: Vec<ChatTurn>,
        user_message: &str,
    ) -> ProviderResponse {
        let request = GenerateRequest {
            system_prompt: persona.to_string(),
            history,
            user_message: user_message.to_string(),
            history_limit: self.history_window,
        };

        let provider = Arc::clone(&self.provider);
        let mut task = tokio::spawn(async move { provider.generate(&request).await });

        let result = match tokio::time::timeout(self.timeout, &mut task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) if join_err.is_panic() => {
                Err(ProviderError::Internal("provider panicked".into()))
            }
            Ok(Err(join_err)) => Err(ProviderError::Internal(join_err.to_string())),
            Err(_) => {
                task.abort();
                Err(ProviderError::Timeout(self.timeout))
            }
        };

        let name = self.provider_name();
        match &result {
            Ok(answer) => debug!(provider = name, model = %answer.model, "provider call succeeded"),
            Err(err) => warn!(provider = name, error = %err, "provider call failed"),
        }
        ProviderResponse::from_result(name, result)
    }
}

impl std::fmt::Debug for ProviderGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderGateway")
            .field("provider", &self.provider.name())
            .field("timeout", &self.timeout)
            .field("history_window", &self.history_window)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use answerdesk_core::Role;
    use answerdesk_test_utils::MockProvider;
    use tracing_test::traced_test;

    fn gateway(mock: &Arc<MockProvider>, timeout: Duration) -> ProviderGateway {
        ProviderGateway::new(mock.clone(), timeout, 2)
    }

    #[tokio::test]
    async fn success_passes_content_through() {
        let mock = Arc::new(MockProvider::with_responses(vec!["Hello there".into()]));
        let resp = gateway(&mock, Duration::from_secs(1))
            .generate("You are Bob.", Vec::new(), "Hi")
            .await;

        assert!(resp.succeeded);
        assert_eq!(resp.content, "Hello there");
        assert_eq!(resp.provider_name, "mock-provider");

        let calls = mock.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system_prompt, "You are Bob.");
        assert_eq!(calls[0].user_message, "Hi");
        assert_eq!(calls[0].history_limit, 2);
    }

    #[tokio::test]
    async fn typed_failure_becomes_diagnostic_content() {
        let mock = Arc::new(MockProvider::new());
        mock.push_error(ProviderError::Http {
            status: 500,
            detail: "boom".into(),
        })
        .await;

        let resp = gateway(&mock, Duration::from_secs(1))
            .generate("persona", Vec::new(), "Hi")
            .await;
        assert!(!resp.succeeded);
        assert!(resp.content.contains("500"));
        assert!(!resp.content.contains("boom"));
    }

    #[tokio::test]
    #[traced_test]
    async fn slow_provider_times_out() {
        let mock = Arc::new(MockProvider::new().with_delay(Duration::from_secs(5)));
        let resp = gateway(&mock, Duration::from_millis(50))
            .generate("persona", Vec::new(), "Hi")
            .await;

        assert!(!resp.succeeded);
        assert_eq!(resp.content, ProviderError::Timeout(Duration::from_millis(50)).user_message());
        assert!(logs_contain("provider call failed"));
    }

    #[tokio::test]
    async fn panicking_provider_is_a_failure_not_a_crash() {
        let mock = Arc::new(MockProvider::new());
        mock.push_panic().await;

        let resp = gateway(&mock, Duration::from_secs(1))
            .generate("persona", Vec::new(), "Hi")
            .await;
        assert!(!resp.succeeded);
        assert!(!resp.content.trim().is_empty());
    }

    #[tokio::test]
    async fn history_is_handed_over_with_window() {
        let mock = Arc::new(MockProvider::new());
        let history = vec![ChatTurn {
            role: Role::User,
            content: "earlier".into(),
        }];
        gateway(&mock, Duration::from_secs(1))
            .generate("persona", history.clone(), "now")
            .await;

        let calls = mock.calls().await;
        assert_eq!(calls[0].history, history);
    }
}
