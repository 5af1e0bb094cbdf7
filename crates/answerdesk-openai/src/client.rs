// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for OpenAI-compatible chat completions endpoints.

use std::time::Duration;

use answerdesk_core::{AnswerdeskError, ProviderError};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::debug;

use crate::types::{ApiErrorResponse, ChatRequest, ChatResponse};

/// Upper bound on a single request. Callers enforce their own, tighter deadline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for one OpenAI-compatible vendor.
///
/// Makes exactly one attempt per call; there is no retry.
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ChatCompletionsClient {
    /// Creates a client for `{base_url}/chat/completions` with bearer auth.
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, AnswerdeskError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
            AnswerdeskError::Config(format!("invalid API key header value: {e}"))
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
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
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends a completion request and decodes the envelope.
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        debug!(status = %status, endpoint = %self.endpoint, "completion response received");

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            let detail = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => match api_err.error.type_ {
                    Some(kind) => format!("{kind}: {}", api_err.error.message),
                    None => api_err.error.message,
                },
                Err(_) => body,
            };
            return Err(ProviderError::Http {
                status: status.as_u16(),
                detail,
            });
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::MalformedResponse(e.to_string()))
    }
}
