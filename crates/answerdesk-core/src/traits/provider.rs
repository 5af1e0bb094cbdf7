// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for generative-AI backends (OpenAI-compatible vendors, Anthropic).

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{GenerateRequest, GeneratedAnswer};

/// A generative backend reachable over HTTP.
///
/// Implementations translate [`GenerateRequest`] into their vendor's request
/// shape and normalise the vendor's response envelope. Every failure mode,
/// including malformed or empty payloads, is reported as a [`ProviderError`];
/// implementations must not panic on upstream data.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Generates one reply for the given persona, history, and user message.
    async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedAnswer, ProviderError>;
}
