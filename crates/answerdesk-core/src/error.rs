// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Answerdesk response engine.

use std::time::Duration;

use thiserror::Error;

/// The primary error type used across adapter traits and core operations.
#[derive(Debug, Error)]
pub enum AnswerdeskError {
    /// Configuration errors (invalid TOML, missing credentials, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Rejected caller input (blank identifiers, blank message text, tenant mismatch).
    ///
    /// Raised before any side effect takes place.
    #[error("invalid input: {0}")]
    Input(String),

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Storage backend errors (connection, query failure, serialization).
    ///
    /// Fatal to the current request but retryable by the caller.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// LLM provider errors that escaped the recovery boundary (construction, credentials).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AnswerdeskError {
    /// Shorthand for a [`AnswerdeskError::NotFound`] error.
    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Shorthand for wrapping an arbitrary message as a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            source: message.into().into(),
        }
    }

    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Timeout { .. })
    }
}

/// Failure of a single generative-provider call.
///
/// These never reach the end user as errors: the provider gateway converts
/// every variant into conversational content via [`ProviderError::user_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The vendor answered with a non-success HTTP status.
    #[error("API returned {status}: {detail}")]
    Http { status: u16, detail: String },

    /// The request never produced an HTTP response (DNS, TLS, connection reset).
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The call exceeded the caller-enforced deadline.
    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),

    /// The response body could not be decoded into the vendor envelope.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// The envelope decoded but carried no usable content.
    #[error("provider returned no content")]
    EmptyResponse,

    /// The provider task failed unexpectedly (panic, cancellation).
    #[error("provider task failed: {0}")]
    Internal(String),
}

impl ProviderError {
    /// Human-readable text shown to the end user in place of a generated answer.
    pub fn user_message(&self) -> String {
        match self {
            Self::Http { status, .. } if *status == 401 || *status == 403 => {
                "I'm not able to reach my AI service right now because of an authentication problem. \
                 Please contact the site owner."
                    .to_string()
            }
            Self::Http { status, .. } if *status == 429 => {
                "I'm receiving a lot of questions right now. Please try again in a moment.".to_string()
            }
            Self::Http { status, .. } => format!(
                "I'm having trouble reaching my AI service right now (HTTP {status}). Please try again shortly."
            ),
            Self::Transport(_) => {
                "I couldn't connect to my AI service. Please try again shortly.".to_string()
            }
            Self::Timeout(_) => {
                "My AI service is taking too long to respond. Please try again shortly.".to_string()
            }
            Self::MalformedResponse(_) | Self::EmptyResponse => {
                "I received an unexpected response from my AI service. Please try rephrasing your question."
                    .to_string()
            }
            Self::Internal(_) => {
                "Something went wrong while generating a reply. Please try again.".to_string()
            }
        }
    }
}
