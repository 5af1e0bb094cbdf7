// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Answerdesk configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. Every section is optional and defaults sensibly.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnswerdeskConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Knowledge retrieval scoring.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Generative provider selection and call limits.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// OpenAI chat completions.
    #[serde(default = "VendorConfig::openai")]
    pub openai: VendorConfig,

    /// Groq (OpenAI-compatible).
    #[serde(default = "VendorConfig::groq")]
    pub groq: VendorConfig,

    /// DeepSeek (OpenAI-compatible).
    #[serde(default = "VendorConfig::deepseek")]
    pub deepseek: VendorConfig,

    /// OpenRouter (OpenAI-compatible).
    #[serde(default = "VendorConfig::openrouter")]
    pub openrouter: VendorConfig,

    /// Anthropic Messages API.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// HTTP gateway.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl Default for AnswerdeskConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            storage: StorageConfig::default(),
            retrieval: RetrievalConfig::default(),
            provider: ProviderConfig::default(),
            openai: VendorConfig::openai(),
            groq: VendorConfig::groq(),
            deepseek: VendorConfig::deepseek(),
            openrouter: VendorConfig::openrouter(),
            anthropic: AnthropicConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name used in logs.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "answerdesk".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("answerdesk").join("answerdesk.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("answerdesk.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Knowledge retrieval scoring.
///
/// `final = keyword_weight * keyword_overlap + text_weight * text_similarity`;
/// a candidate is accepted only when `final > acceptance_threshold`.
/// The defaults reproduce the long-standing production values.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f64,

    #[serde(default = "default_text_weight")]
    pub text_weight: f64,

    #[serde(default = "default_acceptance_threshold")]
    pub acceptance_threshold: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            keyword_weight: default_keyword_weight(),
            text_weight: default_text_weight(),
            acceptance_threshold: default_acceptance_threshold(),
        }
    }
}

fn default_keyword_weight() -> f64 {
    0.4
}

fn default_text_weight() -> f64 {
    0.6
}

fn default_acceptance_threshold() -> f64 {
    0.15
}

/// Which generative backend answers unmatched questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Openai,
    Groq,
    Deepseek,
    Openrouter,
    Anthropic,
}

impl ProviderKind {
    /// Lower-case vendor name, as used in config sections and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Openai => "openai",
            Self::Groq => "groq",
            Self::Deepseek => "deepseek",
            Self::Openrouter => "openrouter",
            Self::Anthropic => "anthropic",
        }
    }
}

/// Generative provider selection and per-call limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Backend used for every generative call. Only one is attempted per request.
    #[serde(default)]
    pub kind: ProviderKind,

    /// Deadline for one provider call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of trailing turns forwarded as history.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Forward prior session turns to the provider.
    ///
    /// Off by default: only the latest user message is sent.
    #[serde(default)]
    pub forward_history: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            timeout_secs: default_timeout_secs(),
            history_window: default_history_window(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            forward_history: false,
        }
    }
}

fn default_timeout_secs() -> u64 {
    8
}

fn default_history_window() -> usize {
    6
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    500
}

/// Endpoint, credentials, and model of one OpenAI-compatible vendor.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VendorConfig {
    /// API key. `None` falls back to the vendor's environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,

    /// Model identifier.
    pub model: String,
}

impl VendorConfig {
    pub fn openai() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }

    pub fn groq() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
        }
    }

    pub fn deepseek() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.deepseek.com/v1".to_string(),
            model: "deepseek-chat".to_string(),
        }
    }

    pub fn openrouter() -> Self {
        Self {
            api_key: None,
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
        }
    }
}

/// Anthropic Messages API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// Anthropic API key. `None` requires the `ANTHROPIC_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Messages endpoint.
    #[serde(default = "default_anthropic_base_url")]
    pub base_url: String,

    /// Default model to use for requests.
    #[serde(default = "default_anthropic_model")]
    pub model: String,

    /// Anthropic API version string.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_anthropic_base_url(),
            model: default_anthropic_model(),
            api_version: default_api_version(),
        }
    }
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token required on `/v1` routes. `None` rejects every API request.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3080
}
