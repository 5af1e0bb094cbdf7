// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across adapter traits and the response engine.

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a [`crate::PluginAdapter`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Storage,
}

/// Author of a transcript turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Where an assistant turn's content came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    /// Verbatim answer of a curated knowledge entry.
    KnowledgeBase,
    /// Text produced (or substituted) on the generative path.
    Generative,
    /// Knowledge-grounded generation. Accepted in stored data, not produced by the orchestrator.
    Hybrid,
}

/// Current UTC time as an RFC 3339 string with microsecond precision.
///
/// Lexicographic order of these strings matches chronological order.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Formats a UTC instant the same way as [`now_timestamp`].
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Generates a fresh random identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A tenant: one customer's chatbot configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chatbot {
    pub id: String,
    pub name: String,
    /// Tenant persona handed to the provider as system prompt.
    /// `None` or blank means onboarding is unfinished.
    pub system_prompt: Option<String>,
    pub created_at: String,
}

impl Chatbot {
    /// Creates a chatbot with a fresh id.
    pub fn new(name: impl Into<String>, system_prompt: Option<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            system_prompt,
            created_at: now_timestamp(),
        }
    }

    /// The persona, if one is configured and not blank.
    pub fn persona(&self) -> Option<&str> {
        self.system_prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// A curated question/answer pair owned by one tenant.
///
/// Entries are never mutated after creation; edits are a store write
/// followed by an index reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub id: String,
    /// Owning tenant. `None` only for malformed rows, which the index drops.
    pub chatbot_id: Option<String>,
    pub question: String,
    pub answer: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    /// Deduplicated, lower-cased keywords derived once at creation.
    pub keywords: BTreeSet<String>,
    pub source_document_id: Option<String>,
    /// Free-form JSON metadata.
    pub metadata: Option<String>,
    pub created_at: String,
}

/// A single conversation between one end user and one chatbot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub chatbot_id: String,
    pub user_identity: String,
    pub created_at: String,
    pub updated_at: String,
    pub is_active: bool,
}

impl Session {
    /// Creates an active session with a fresh id.
    pub fn new(chatbot_id: impl Into<String>, user_identity: impl Into<String>) -> Self {
        let now = now_timestamp();
        Self {
            id: new_id(),
            chatbot_id: chatbot_id.into(),
            user_identity: user_identity.into(),
            created_at: now.clone(),
            updated_at: now,
            is_active: true,
        }
    }
}

/// One persisted transcript turn. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub session_id: String,
    pub role: Role,
    pub content: String,
    /// Set on assistant turns only.
    pub response_source: Option<ResponseSource>,
    /// Provenance JSON (score, matched entry, provider) for assistant turns.
    pub metadata: Option<String>,
    pub created_at: String,
}

impl Message {
    /// Creates a user turn stamped with the current time.
    pub fn user(session_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            session_id: session_id.into(),
            role: Role::User,
            content: content.into(),
            response_source: None,
            metadata: None,
            created_at: now_timestamp(),
        }
    }

    /// Creates an assistant turn tagged with its response source.
    pub fn assistant(
        session_id: impl Into<String>,
        content: impl Into<String>,
        source: ResponseSource,
    ) -> Self {
        Self {
            id: new_id(),
            session_id: session_id.into(),
            role: Role::Assistant,
            content: content.into(),
            response_source: Some(source),
            metadata: None,
            created_at: now_timestamp(),
        }
    }

    /// Attaches provenance metadata.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata.to_string());
        self
    }
}

/// Outcome of ranking one query against one tenant's knowledge.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalResult {
    /// Best candidate seen, accepted or not.
    pub matched_entry: Option<std::sync::Arc<KnowledgeEntry>>,
    pub score: f64,
    pub accepted: bool,
}

impl RetrievalResult {
    /// A result with no candidate at all.
    pub fn no_match() -> Self {
        Self {
            matched_entry: None,
            score: 0.0,
            accepted: false,
        }
    }

    /// The matched entry, only when it passed the acceptance gate.
    pub fn accepted_entry(&self) -> Option<&KnowledgeEntry> {
        if self.accepted {
            self.matched_entry.as_deref()
        } else {
            None
        }
    }
}

/// A prior turn handed to a provider as conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for ChatTurn {
    fn from(msg: &Message) -> Self {
        Self {
            role: msg.role,
            content: msg.content.clone(),
        }
    }
}

/// Vendor-neutral generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// Tenant persona. Combined with the fixed base instruction by each provider.
    pub system_prompt: String,
    /// Prior turns, oldest first.
    pub history: Vec<ChatTurn>,
    pub user_message: String,
    /// Maximum number of trailing history turns sent upstream.
    pub history_limit: usize,
}

impl GenerateRequest {
    /// Creates a request without history.
    pub fn new(system_prompt: impl Into<String>, user_message: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            history: Vec::new(),
            user_message: user_message.into(),
            history_limit: crate::prompt::DEFAULT_HISTORY_WINDOW,
        }
    }

    /// The bounded trailing window of history to send upstream.
    ///
    /// System turns are excluded; the system prompt travels separately.
    pub fn recent_history(&self) -> Vec<&ChatTurn> {
        let turns: Vec<&ChatTurn> = self
            .history
            .iter()
            .filter(|t| t.role != Role::System)
            .collect();
        let skip = turns.len().saturating_sub(self.history_limit);
        turns.into_iter().skip(skip).collect()
    }
}

/// Successful generation, normalised from a vendor envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedAnswer {
    pub content: String,
    pub model: String,
}

/// Normalised provider outcome consumed by the orchestrator.
///
/// `content` is always presentable: the generated text on success,
/// a diagnostic sentence on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderResponse {
    pub content: String,
    pub succeeded: bool,
    pub provider_name: String,
}

impl ProviderResponse {
    /// The single conversion point from a typed provider result to user-facing content.
    pub fn from_result(
        provider_name: &str,
        result: Result<GeneratedAnswer, crate::error::ProviderError>,
    ) -> Self {
        match result {
            Ok(answer) => Self {
                content: answer.content,
                succeeded: true,
                provider_name: provider_name.to_string(),
            },
            Err(err) => Self {
                content: err.user_message(),
                succeeded: false,
                provider_name: provider_name.to_string(),
            },
        }
    }
}

/// What `resolve` hands back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAnswer {
    pub content: String,
    pub source: ResponseSource,
    pub is_from_ai: bool,
    /// Blended retrieval score of the best candidate, when ranking ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_entry_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}
