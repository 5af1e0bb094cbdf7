// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./answerdesk.toml` > `~/.config/answerdesk/answerdesk.toml`
//! > `/etc/answerdesk/answerdesk.toml` with environment variable overrides via the
//! `ANSWERDESK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::AnswerdeskConfig;

/// Config sections that env vars may address, e.g. `ANSWERDESK_PROVIDER_TIMEOUT_SECS`.
const SECTIONS: &[&str] = &[
    "service",
    "storage",
    "retrieval",
    "provider",
    "openai",
    "groq",
    "deepseek",
    "openrouter",
    "anthropic",
    "gateway",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/answerdesk/answerdesk.toml` (system-wide)
/// 3. `~/.config/answerdesk/answerdesk.toml` (user XDG config)
/// 4. `./answerdesk.toml` (local directory)
/// 5. `ANSWERDESK_*` environment variables
pub fn load_config() -> Result<AnswerdeskConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<AnswerdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AnswerdeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<AnswerdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AnswerdeskConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Config files consulted by [`load_config`], lowest precedence first.
pub fn config_file_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/answerdesk/answerdesk.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("answerdesk").join("answerdesk.toml"));
    }
    paths.push(PathBuf::from("answerdesk.toml"));
    paths
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    config_file_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(AnswerdeskConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Create the environment variable provider with explicit section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `ANSWERDESK_PROVIDER_TIMEOUT_SECS` must map to
/// `provider.timeout_secs`, not `provider.timeout.secs`.
fn env_provider() -> Env {
    Env::prefixed("ANSWERDESK_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lower-cased, prefix-stripped env key to a dotted config path.
fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("provider_timeout_secs"), "provider.timeout_secs");
        assert_eq!(map_env_key("openai_api_key"), "openai.api_key");
        assert_eq!(
            map_env_key("retrieval_acceptance_threshold"),
            "retrieval.acceptance_threshold"
        );
        assert_eq!(map_env_key("unknown"), "unknown");
    }

    #[test]
    fn env_override_wins_over_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "answerdesk.toml",
                r#"
[provider]
kind = "groq"
timeout_secs = 3
"#,
            )?;
            jail.set_env("ANSWERDESK_PROVIDER_TIMEOUT_SECS", "12");
            jail.set_env("ANSWERDESK_GATEWAY_BEARER_TOKEN", "secret");

            let config = load_config_from_path(Path::new("answerdesk.toml"))?;
            assert_eq!(config.provider.timeout_secs, 12);
            assert_eq!(config.provider.kind, crate::model::ProviderKind::Groq);
            assert_eq!(config.gateway.bearer_token.as_deref(), Some("secret"));
            Ok(())
        });
    }
}
