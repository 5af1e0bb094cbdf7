// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Answerdesk response engine.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and diagnostic
//! error rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use answerdesk_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Provider: {}", config.provider.kind.as_str());
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError, TomlSource};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{AnswerdeskConfig, ProviderKind, RetrievalConfig};

/// Load configuration from the XDG hierarchy and validate it.
///
/// On a Figment error the failure is converted into miette diagnostics with
/// source spans taken from whichever config files exist on disk.
pub fn load_and_validate() -> Result<AnswerdeskConfig, Vec<ConfigError>> {
    checked(loader::load_config(), || {
        loader::config_file_paths()
            .iter()
            .filter_map(|path| read_source(path))
            .collect()
    })
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<AnswerdeskConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        read_source(path).into_iter().collect()
    })
}

/// Load configuration from a specific TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<AnswerdeskConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![TomlSource::new("<inline>", toml_content)]
    })
}

/// Validate a loaded config, or turn the load failure into diagnostics.
/// Sources are only read when there is an error to point into.
fn checked(
    loaded: Result<AnswerdeskConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<TomlSource>,
) -> Result<AnswerdeskConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(ConfigError::from_figment(err, &sources())),
    }
}

/// Figment reports files by absolute path, so relative paths are resolved first.
fn read_source(path: &Path) -> Option<TomlSource> {
    let content = std::fs::read_to_string(path).ok()?;
    let name = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    Some(TomlSource::new(name.display().to_string(), content))
}
