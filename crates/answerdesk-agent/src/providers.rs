// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider selection from configuration.

use std::sync::Arc;

use answerdesk_anthropic::AnthropicProvider;
use answerdesk_config::model::{AnswerdeskConfig, ProviderKind};
use answerdesk_core::{AnswerdeskError, ProviderAdapter};
use answerdesk_openai::{OpenAiCompatProvider, Vendor};

/// Builds the single provider named by `provider.kind`.
///
/// Fails with a configuration error when the selected vendor has no API key.
pub fn build_provider(config: &AnswerdeskConfig) -> Result<Arc<dyn ProviderAdapter>, AnswerdeskError> {
    let limits = &config.provider;
    let provider: Arc<dyn ProviderAdapter> = match config.provider.kind {
        ProviderKind::Openai => Arc::new(OpenAiCompatProvider::new(Vendor::OpenAi, &config.openai, limits)?),
        ProviderKind::Groq => Arc::new(OpenAiCompatProvider::new(Vendor::Groq, &config.groq, limits)?),
        ProviderKind::Deepseek => {
            Arc::new(OpenAiCompatProvider::new(Vendor::DeepSeek, &config.deepseek, limits)?)
        }
        ProviderKind::Openrouter => {
            Arc::new(OpenAiCompatProvider::new(Vendor::OpenRouter, &config.openrouter, limits)?)
        }
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(&config.anthropic, limits)?),
    };
    Ok(provider)
}
