// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Anthropic Messages API.
//!
//! Provides [`AnthropicClient`] which handles request construction,
//! authentication, and error-body decoding. Each request is one attempt.

use std::time::Duration;

use answerdesk_core::{AnswerdeskError, ProviderError};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{ApiErrorResponse, MessageRequest, MessageResponse};

/// Upper bound on a single request. Callers enforce their own, tighter deadline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for Anthropic API communication.
///
/// Manages authentication headers and connection pooling.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    base_url: String,
}

impl AnthropicClient {
    /// Creates a new Anthropic API client posting to `base_url`.
    pub fn new(api_key: &str, api_version: &str, base_url: &str) -> Result<Self, AnswerdeskError> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key).map_err(|e| {
            AnswerdeskError::Config(format!("invalid API key header value: {e}"))
        })?;
        key.set_sensitive(true);
        headers.insert("x-api-key", key);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_str(api_version).map_err(|e| {
                AnswerdeskError::Config(format!("invalid API version header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AnswerdeskError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Sends a request and returns the full response.
    ///
    /// Non-success statuses, including 429 and 5xx, fail immediately.
    pub async fn complete_message(
        &self,
        request: &MessageRequest,
    ) -> Result<MessageResponse, ProviderError> {
        let response = self
            .client
            .post(&self.base_url)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        debug!(status = %status, "completion response received");

        let body = response.text().await.map_err(|e| {
            ProviderError::Transport(format!("failed to read response body: {e}"))
        })?;

        if status.is_success() {
            return serde_json::from_str(&body)
                .map_err(|e| ProviderError::MalformedResponse(e.to_string()));
        }

        let detail = match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api_err) => format!("{}: {}", api_err.error.type_, api_err.error.message),
            Err(_) => body,
        };
        Err(ProviderError::Http {
            status: status.as_u16(),
            detail,
        })
    }
}
