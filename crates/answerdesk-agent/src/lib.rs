// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response orchestration for the Answerdesk engine.
//!
//! The [`ResponseOrchestrator`] is the central coordinator that:
//! - Validates the tenant, session, and message
//! - Persists the user turn
//! - Answers from the tenant's curated knowledge when it matches well enough
//! - Otherwise asks the configured provider through the [`ProviderGateway`]
//! - Persists the assistant turn with provenance metadata

pub mod orchestrator;
pub mod provider_gateway;
pub mod providers;

pub use orchestrator::{NO_PERSONA_FALLBACK, RECOVERY_FALLBACK, ResolveState, ResponseOrchestrator};
pub use provider_gateway::ProviderGateway;
pub use providers::build_provider;
