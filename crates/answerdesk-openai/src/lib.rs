// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible provider adapter for the Answerdesk response engine.
//!
//! OpenAI, Groq, DeepSeek, and OpenRouter all speak the same chat completions
//! protocol and differ only in endpoint, credentials, and model names, so a
//! single [`OpenAiCompatProvider`] serves all four.

pub mod client;
pub mod types;

use async_trait::async_trait;
use answerdesk_config::model::{ProviderConfig, VendorConfig};
use answerdesk_core::prompt::compose_system_prompt;
use answerdesk_core::{
    AdapterType, AnswerdeskError, GenerateRequest, GeneratedAnswer, HealthStatus, PluginAdapter,
    ProviderAdapter, ProviderError,
};
use strum::{Display, EnumString};
use tracing::{debug, info};

use crate::client::ChatCompletionsClient;
use crate::types::{ChatMessage, ChatRequest};

/// The OpenAI-compatible vendors Answerdesk knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Vendor {
    OpenAi,
    Groq,
    DeepSeek,
    OpenRouter,
}

impl Vendor {
    /// Environment variable consulted when the config has no API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Groq => "GROQ_API_KEY",
            Self::DeepSeek => "DEEPSEEK_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
        }
    }
}

/// Chat completions provider implementing [`ProviderAdapter`].
///
/// API key resolution order: vendor config -> vendor env var -> error.
pub struct OpenAiCompatProvider {
    vendor: Vendor,
    name: String,
    client: ChatCompletionsClient,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiCompatProvider {
    /// Creates a provider for `vendor` from its config section and the shared call limits.
    pub fn new(
        vendor: Vendor,
        vendor_config: &VendorConfig,
        provider_config: &ProviderConfig,
    ) -> Result<Self, AnswerdeskError> {
        let api_key = resolve_api_key(vendor, vendor_config.api_key.as_deref())?;
        let client = ChatCompletionsClient::new(&api_key, &vendor_config.base_url)?;

        info!(
            vendor = %vendor,
            model = %vendor_config.model,
            "chat completions provider initialized"
        );

        Ok(Self {
            vendor,
            name: vendor.to_string(),
            client,
            model: vendor_config.model.clone(),
            temperature: provider_config.temperature,
            max_tokens: provider_config.max_tokens,
        })
    }

    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    /// Builds the vendor request: system prompt, bounded history, then the user message.
    fn to_chat_request(&self, request: &GenerateRequest) -> ChatRequest {
        let mut messages = vec![ChatMessage::new(
            "system",
            compose_system_prompt(&request.system_prompt),
        )];
        messages.extend(
            request
                .recent_history()
                .into_iter()
                .map(|turn| ChatMessage::new(turn.role.to_string(), turn.content.clone())),
        );
        messages.push(ChatMessage::new("user", request.user_message.clone()));

        ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, AnswerdeskError> {
        // No probe request: every call costs tokens.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), AnswerdeskError> {
        debug!(vendor = %self.vendor, "chat completions provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiCompatProvider {
    async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedAnswer, ProviderError> {
        let api_request = self.to_chat_request(request);
        let response = self.client.complete(&api_request).await?;
        let content = response
            .first_content()
            .ok_or(ProviderError::EmptyResponse)?
            .trim()
            .to_string();
        Ok(GeneratedAnswer {
            content,
            model: response.model.unwrap_or_else(|| self.model.clone()),
        })
    }
}

/// Resolves the API key from config or the vendor's environment variable.
fn resolve_api_key(vendor: Vendor, config_key: Option<&str>) -> Result<String, AnswerdeskError> {
    if let Some(key) = config_key
        && !key.trim().is_empty()
    {
        return Ok(key.to_string());
    }

    std::env::var(vendor.api_key_env())
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            AnswerdeskError::Config(format!(
                "{vendor} API key not found. Set {vendor}.api_key in config or the {} environment variable.",
                vendor.api_key_env()
            ))
        })
}
