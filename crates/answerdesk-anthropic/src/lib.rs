// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Claude provider adapter for the Answerdesk response engine.
//!
//! This crate implements [`ProviderAdapter`] for the Anthropic Messages API.

pub mod client;
pub mod types;

use async_trait::async_trait;
use answerdesk_config::model::{AnthropicConfig, ProviderConfig};
use answerdesk_core::prompt::compose_system_prompt;
use answerdesk_core::{
    AdapterType, AnswerdeskError, GenerateRequest, GeneratedAnswer, HealthStatus, PluginAdapter,
    ProviderAdapter, ProviderError, Role,
};
use tracing::{debug, info};

use crate::client::AnthropicClient;
use crate::types::{ApiMessage, MessageRequest};

/// Anthropic Claude provider implementing [`ProviderAdapter`].
///
/// API key resolution order: config -> `ANTHROPIC_API_KEY` env var -> error.
pub struct AnthropicProvider {
    client: AnthropicClient,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AnthropicProvider {
    /// Creates a new Anthropic provider from its config section and the shared call limits.
    pub fn new(
        config: &AnthropicConfig,
        provider_config: &ProviderConfig,
    ) -> Result<Self, AnswerdeskError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = AnthropicClient::new(&api_key, &config.api_version, &config.base_url)?;

        info!(model = config.model, "Anthropic provider initialized");

        Ok(Self::with_client(client, config.model.clone(), provider_config))
    }

    /// Creates a provider around an existing client.
    pub fn with_client(
        client: AnthropicClient,
        model: String,
        provider_config: &ProviderConfig,
    ) -> Self {
        Self {
            client,
            model,
            temperature: provider_config.temperature,
            max_tokens: provider_config.max_tokens,
        }
    }

    /// Converts a [`GenerateRequest`] to an Anthropic [`MessageRequest`].
    ///
    /// The persona travels in the top-level `system` field. History turns are
    /// folded so roles alternate and the conversation opens with a user turn.
    fn to_message_request(&self, request: &GenerateRequest) -> MessageRequest {
        let mut messages: Vec<ApiMessage> = Vec::new();
        let turns = request
            .recent_history()
            .into_iter()
            .map(|t| (t.role, t.content.as_str()))
            .chain(std::iter::once((Role::User, request.user_message.as_str())));

        for (role, content) in turns {
            let role = match role {
                Role::Assistant => "assistant",
                _ => "user",
            };
            if messages.is_empty() && role == "assistant" {
                continue;
            }
            match messages.last_mut() {
                Some(last) if last.role == role => {
                    last.content.push_str("\n\n");
                    last.content.push_str(content);
                }
                _ => messages.push(ApiMessage {
                    role: role.to_string(),
                    content: content.to_string(),
                }),
            }
        }

        MessageRequest {
            model: self.model.clone(),
            messages,
            system: Some(compose_system_prompt(&request.system_prompt)),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl PluginAdapter for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, AnswerdeskError> {
        // Avoid making a real API call for health checks -- just confirm the client exists.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), AnswerdeskError> {
        debug!("Anthropic provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicProvider {
    async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedAnswer, ProviderError> {
        let api_request = self.to_message_request(request);
        let response = self.client.complete_message(&api_request).await?;
        let content = response.text().ok_or(ProviderError::EmptyResponse)?;
        debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = response.stop_reason.as_deref().unwrap_or("unknown"),
            "anthropic completion"
        );
        Ok(GeneratedAnswer {
            content,
            model: response.model,
        })
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, AnswerdeskError> {
    if let Some(key) = config_key
        && !key.trim().is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var("ANTHROPIC_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            AnswerdeskError::Config(
                "Anthropic API key not found. Set anthropic.api_key in config or ANTHROPIC_API_KEY environment variable.".into(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use answerdesk_core::ChatTurn;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn offline_provider() -> AnthropicProvider {
        let client =
            AnthropicClient::new("test-key", "2023-06-01", "http://127.0.0.1:9/").unwrap();
        AnthropicProvider::with_client(client, "claude-test".into(), &ProviderConfig::default())
    }

    fn turn(role: Role, content: &str) -> ChatTurn {
        ChatTurn {
            role,
            content: content.into(),
        }
    }

    #[test]
    fn resolve_api_key_from_config() {
        let result = resolve_api_key(&Some("sk-test-123".into()));
        assert_eq!(result.unwrap(), "sk-test-123");
    }

    #[test]
    fn resolve_api_key_none_falls_back_to_env() {
        let result = resolve_api_key(&None);
        // Will succeed if env is set, fail otherwise.
        if let Err(err) = result {
            assert!(err.to_string().contains("API key not found"), "got: {err}");
        }
    }

    #[test]
    fn to_message_request_puts_persona_in_system() {
        let provider = offline_provider();
        let req = provider.to_message_request(&GenerateRequest::new("You are Bob.", "Hi"));

        let system = req.system.unwrap();
        assert!(system.ends_with("You are Bob."));
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.messages[0].role, "user");
        assert_eq!(req.messages[0].content, "Hi");
        assert_eq!(req.max_tokens, 500);
        assert_eq!(req.model, "claude-test");
    }

    #[test]
    fn to_message_request_folds_history_into_alternating_turns() {
        let provider = offline_provider();
        let mut request = GenerateRequest::new("persona", "and on weekends?");
        request.history = vec![
            turn(Role::Assistant, "Welcome!"),
            turn(Role::User, "hours?"),
            turn(Role::Assistant, "9 to 5."),
            turn(Role::User, "thanks"),
        ];

        let req = provider.to_message_request(&request);
        let roles: Vec<&str> = req.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["user", "assistant", "user"]);
        assert_eq!(req.messages[2].content, "thanks\n\nand on weekends?");
    }

    #[tokio::test]
    async fn generate_returns_joined_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1",
                "type": "message",
                "role": "assistant",
                "content": [{"type": "text", "text": "We open at nine."}],
                "model": "claude-test",
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 12, "output_tokens": 4}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AnthropicClient::new("k", "2023-06-01", &server.uri()).unwrap();
        let provider =
            AnthropicProvider::with_client(client, "claude-test".into(), &ProviderConfig::default());
        let answer = provider
            .generate(&GenerateRequest::new("persona", "When do you open?"))
            .await
            .unwrap();
        assert_eq!(answer.content, "We open at nine.");
        assert_eq!(answer.model, "claude-test");
    }

    #[tokio::test]
    async fn generate_without_text_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_2",
                "content": [],
                "model": "claude-test"
            })))
            .mount(&server)
            .await;

        let client = AnthropicClient::new("k", "2023-06-01", &server.uri()).unwrap();
        let provider =
            AnthropicProvider::with_client(client, "claude-test".into(), &ProviderConfig::default());
        let err = provider
            .generate(&GenerateRequest::new("persona", "hello"))
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::EmptyResponse);
    }

    #[tokio::test]
    async fn generate_surfaces_overload_from_one_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_json(serde_json::json!({
                "error": {"type": "overloaded_error", "message": "Overloaded"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AnthropicClient::new("k", "2023-06-01", &server.uri()).unwrap();
        let provider =
            AnthropicProvider::with_client(client, "claude-test".into(), &ProviderConfig::default());
        let err = provider
            .generate(&GenerateRequest::new("persona", "hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Http { status: 529, .. }));
    }

    #[test]
    fn plugin_adapter_metadata() {
        let provider = offline_provider();
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.version(), semver::Version::new(0, 1, 0));
        assert_eq!(provider.adapter_type(), AdapterType::Provider);
    }
}
