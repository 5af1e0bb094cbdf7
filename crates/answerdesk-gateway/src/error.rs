// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from engine errors to HTTP responses.

use answerdesk_core::AnswerdeskError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// An [`AnswerdeskError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub AnswerdeskError);

impl From<AnswerdeskError> for ApiError {
    fn from(err: AnswerdeskError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AnswerdeskError::Input(_) => StatusCode::BAD_REQUEST,
            AnswerdeskError::NotFound { .. } => StatusCode::NOT_FOUND,
            AnswerdeskError::Storage { .. } | AnswerdeskError::Timeout { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = %status, error = %self.0, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (AnswerdeskError::Input("blank".into()), StatusCode::BAD_REQUEST),
            (AnswerdeskError::not_found("chatbot", "x"), StatusCode::NOT_FOUND),
            (AnswerdeskError::storage("locked"), StatusCode::SERVICE_UNAVAILABLE),
            (
                AnswerdeskError::Timeout {
                    duration: Duration::from_secs(1),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (AnswerdeskError::Internal("bug".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AnswerdeskError::Config("bad".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }

    #[test]
    fn error_response_serializes() {
        let resp = ErrorResponse {
            error: "something went wrong".to_string(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("something went wrong"));
    }
}
