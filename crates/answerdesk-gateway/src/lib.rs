// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Answerdesk response engine.
//!
//! Exposes tenant, session, message, and knowledge management as a small
//! JSON API on axum, guarded by a shared bearer token.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use error::{ApiError, ErrorResponse};
pub use server::{GatewayState, build_router, start_server};
