// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as weight ranges, non-zero deadlines, and non-empty paths.

use crate::diagnostic::ConfigError;
use crate::model::AnswerdeskConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &AnswerdeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let retrieval = &config.retrieval;
    for (key, value) in [
        ("keyword_weight", retrieval.keyword_weight),
        ("text_weight", retrieval.text_weight),
    ] {
        if !(0.0..=1.0).contains(&value) {
            fail(format!("retrieval.{key} must be within [0, 1], got {value}"));
        }
    }
    if retrieval.keyword_weight + retrieval.text_weight <= 0.0 {
        fail("retrieval weights must not both be zero".to_string());
    }
    if !(0.0..1.0).contains(&retrieval.acceptance_threshold) {
        fail(format!(
            "retrieval.acceptance_threshold must be within [0, 1), got {}",
            retrieval.acceptance_threshold
        ));
    }

    let provider = &config.provider;
    if provider.timeout_secs == 0 {
        fail("provider.timeout_secs must be greater than zero".to_string());
    }
    if provider.history_window == 0 {
        fail("provider.history_window must be at least 1".to_string());
    }
    if !(0.0..=2.0).contains(&provider.temperature) {
        fail(format!(
            "provider.temperature must be within [0, 2], got {}",
            provider.temperature
        ));
    }
    if provider.max_tokens == 0 {
        fail("provider.max_tokens must be greater than zero".to_string());
    }

    for (section, vendor) in [
        ("openai", &config.openai),
        ("groq", &config.groq),
        ("deepseek", &config.deepseek),
        ("openrouter", &config.openrouter),
    ] {
        if !vendor.base_url.starts_with("http://") && !vendor.base_url.starts_with("https://") {
            fail(format!(
                "{section}.base_url must be an http(s) URL, got `{}`",
                vendor.base_url
            ));
        }
        if vendor.model.trim().is_empty() {
            fail(format!("{section}.model must not be empty"));
        }
    }
    if config.anthropic.model.trim().is_empty() {
        fail("anthropic.model must not be empty".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if let Some(token) = &config.gateway.bearer_token
        && token.trim().is_empty()
    {
        fail("gateway.bearer_token must not be blank when set".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &AnswerdeskConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&AnswerdeskConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = AnswerdeskConfig::default();
        config.storage.database_path = " ".to_string();
        assert!(messages(&config).iter().any(|m| m.contains("database_path")));
    }

    #[test]
    fn out_of_range_threshold_fails_validation() {
        let mut config = AnswerdeskConfig::default();
        config.retrieval.acceptance_threshold = 1.0;
        assert!(messages(&config)
            .iter()
            .any(|m| m.contains("acceptance_threshold")));
    }

    #[test]
    fn zero_weights_fail_validation() {
        let mut config = AnswerdeskConfig::default();
        config.retrieval.keyword_weight = 0.0;
        config.retrieval.text_weight = 0.0;
        assert!(messages(&config).iter().any(|m| m.contains("both be zero")));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = AnswerdeskConfig::default();
        config.provider.timeout_secs = 0;
        config.provider.history_window = 0;
        config.gateway.host = String::new();
        assert_eq!(messages(&config).len(), 3);
    }

    #[test]
    fn non_http_vendor_url_fails_validation() {
        let mut config = AnswerdeskConfig::default();
        config.groq.base_url = "ftp://groq".to_string();
        assert!(messages(&config).iter().any(|m| m.contains("groq.base_url")));
    }
}
