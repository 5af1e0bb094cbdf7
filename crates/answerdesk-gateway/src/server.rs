// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use answerdesk_agent::ResponseOrchestrator;
use answerdesk_config::model::GatewayConfig;
use answerdesk_core::AnswerdeskError;
use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub orchestrator: Arc<ResponseOrchestrator>,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

impl GatewayState {
    pub fn new(orchestrator: Arc<ResponseOrchestrator>) -> Self {
        Self {
            orchestrator,
            start_time: Instant::now(),
        }
    }
}

/// Build the full router.
///
/// - GET /health (public)
/// - everything under /v1 (bearer auth)
pub fn build_router(state: GatewayState, auth: AuthConfig) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_public_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/v1/chatbots", post(handlers::create_chatbot))
        .route("/v1/chatbots/{chatbot_id}", get(handlers::get_chatbot))
        .route(
            "/v1/chatbots/{chatbot_id}/sessions",
            post(handlers::start_session),
        )
        .route(
            "/v1/chatbots/{chatbot_id}/sessions/{session_id}",
            delete(handlers::end_session),
        )
        .route(
            "/v1/chatbots/{chatbot_id}/sessions/{session_id}/messages",
            post(handlers::post_message).get(handlers::get_transcript),
        )
        .route(
            "/v1/chatbots/{chatbot_id}/knowledge",
            get(handlers::list_knowledge).post(handlers::add_knowledge),
        )
        .route(
            "/v1/chatbots/{chatbot_id}/knowledge/reload",
            post(handlers::reload_knowledge),
        )
        .route(
            "/v1/chatbots/{chatbot_id}/knowledge/{entry_id}",
            delete(handlers::delete_knowledge),
        )
        .route_layer(axum_middleware::from_fn_with_state(auth, auth_middleware))
        .with_state(state);

    Router::new().merge(public_routes).merge(api_routes).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}

/// Bind `host:port` and serve until `shutdown` resolves.
pub async fn start_server(
    config: &GatewayConfig,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), AnswerdeskError> {
    let auth = AuthConfig::from_gateway(config);
    if auth.bearer_token.is_none() {
        tracing::warn!("gateway.bearer_token is not set -- every /v1 request will be rejected");
    }
    let app = build_router(state, auth);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AnswerdeskError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!(%addr, "gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AnswerdeskError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
