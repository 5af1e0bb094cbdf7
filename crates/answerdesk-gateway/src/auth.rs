// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared bearer-token guard for the `/v1` routes.
//!
//! Fail-closed: with no token configured every request is refused.

use answerdesk_config::model::GatewayConfig;
use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ErrorResponse;

#[derive(Clone, Default)]
pub struct AuthConfig {
    pub bearer_token: Option<String>,
}

impl AuthConfig {
    pub fn from_gateway(config: &GatewayConfig) -> Self {
        Self {
            bearer_token: config.bearer_token.clone().filter(|t| !t.is_empty()),
        }
    }

    /// Whether `headers` carry `Authorization: Bearer <configured token>`.
    pub fn admits(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = self.bearer_token.as_deref() else {
            return false;
        };
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|presented| presented == expected)
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = self.bearer_token.as_ref().map(|_| "[redacted]");
        f.debug_struct("AuthConfig").field("bearer_token", &token).finish()
    }
}

pub async fn auth_middleware(State(auth): State<AuthConfig>, request: Request, next: Next) -> Response {
    if auth.admits(request.headers()) {
        return next.run(request).await;
    }
    if auth.bearer_token.is_none() {
        tracing::debug!(path = %request.uri().path(), "rejected: no bearer token configured");
    }
    let body = ErrorResponse {
        error: "missing or invalid bearer token".to_string(),
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
