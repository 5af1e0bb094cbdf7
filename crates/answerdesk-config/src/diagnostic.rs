// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config diagnostics.
//!
//! Figment failures become [`ConfigError`] values that miette can render with
//! the offending line highlighted. Unknown keys get a "did you mean" hint from
//! Jaro-Winkler similarity against the keys the section accepts.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Similarity a known key needs before it is offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// One TOML document that took part in loading, kept for span lookup.
#[derive(Debug, Clone)]
pub struct TomlSource {
    /// Display name: a file path, or `<inline>` for string input.
    pub name: String,
    pub content: String,
}

impl TomlSource {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(code(answerdesk::config::unknown_key), help("{hint}"))]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        hint: String,
        #[label("not a recognized key here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: {detail}")]
    #[diagnostic(code(answerdesk::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(answerdesk::config::missing_key),
        help("set `{key}` in answerdesk.toml")
    )]
    MissingKey { key: String },

    /// A value parsed but breaks a semantic rule (range, non-empty, ...).
    #[error("validation error: {message}")]
    #[diagnostic(code(answerdesk::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(answerdesk::config::other))]
    Other(String),
}

impl ConfigError {
    /// Split a figment error into one diagnostic per underlying failure.
    pub fn from_figment(err: figment::Error, sources: &[TomlSource]) -> Vec<Self> {
        use figment::error::Kind;

        err.into_iter()
            .map(|error| {
                let key_path = error
                    .path
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>();
                match &error.kind {
                    Kind::UnknownField(field, accepted) => {
                        let suggestion = suggest_key(field, *accepted);
                        let hint = match &suggestion {
                            Some(s) => format!("did you mean `{s}`? accepted keys: {}", accepted.join(", ")),
                            None => format!("accepted keys: {}", accepted.join(", ")),
                        };
                        let located = origin_of(&error, sources).and_then(|source| {
                            locate_key(&source.content, &key_path, field).map(|offset| {
                                (
                                    SourceSpan::new(offset.into(), field.len()),
                                    NamedSource::new(&source.name, source.content.clone()),
                                )
                            })
                        });
                        let (span, src) = located.unzip();
                        ConfigError::UnknownKey {
                            key: field.clone(),
                            suggestion,
                            hint,
                            span,
                            src,
                        }
                    }
                    Kind::MissingField(field) => ConfigError::MissingKey {
                        key: field.to_string(),
                    },
                    Kind::InvalidType(found, expected) => ConfigError::InvalidType {
                        key: key_path.join("."),
                        detail: format!("found {found}, expected {expected}"),
                        expected: expected.clone(),
                    },
                    _ => ConfigError::Other(error.to_string()),
                }
            })
            .collect()
    }
}

/// The TOML document an error came from. String input carries no file
/// metadata, so a lone source is assumed to be it.
fn origin_of<'a>(error: &figment::error::Error, sources: &'a [TomlSource]) -> Option<&'a TomlSource> {
    let file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });
    match file {
        Some(file) => sources.iter().find(|s| s.name == file),
        None if sources.len() == 1 => sources.first(),
        None => None,
    }
}

/// Byte offset of `field` as a key inside the `[section]` named by `key_path`.
///
/// Top-level keys (empty path) are searched from the start of the document.
pub fn locate_key(content: &str, key_path: &[&str], field: &str) -> Option<usize> {
    let body_start = match key_path.first() {
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header)? + header.len()
        }
        None => 0,
    };

    let mut line_start = body_start;
    for line in content[body_start..].split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        let rest = &line[indent..];
        let is_key = rest
            .strip_prefix(field)
            .and_then(|after| after.chars().next())
            .is_some_and(|c| c == '=' || (c.is_whitespace() && c != '\n'));
        if is_key {
            return Some(line_start + indent);
        }
        line_start += line.len();
    }
    None
}

/// The accepted key closest to `unknown`, if any is close enough.
pub fn suggest_key<S: AsRef<str>>(unknown: &str, accepted: &[S]) -> Option<String> {
    accepted
        .iter()
        .map(|key| (key.as_ref(), strsim::jaro_winkler(unknown, key.as_ref())))
        .filter(|(_, score)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(key, _)| key.to_string())
}

/// Print diagnostics to stderr through miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_timeout_secs_for_typo() {
        let accepted = ["kind", "timeout_secs", "history_window"];
        assert_eq!(suggest_key("timout_secs", &accepted).as_deref(), Some("timeout_secs"));
    }

    #[test]
    fn suggests_threshold_for_typo() {
        let accepted = ["keyword_weight", "text_weight", "acceptance_threshold"];
        assert_eq!(
            suggest_key("acceptance_treshold", &accepted).as_deref(),
            Some("acceptance_threshold")
        );
    }

    #[test]
    fn distant_typo_gets_no_suggestion() {
        assert_eq!(suggest_key("zzzzzz", &["host", "port", "bearer_token"]), None);
    }

    #[test]
    fn locates_key_inside_its_section() {
        let content = "[service]\nname = \"x\"\n[provider]\n  timout_secs = 3\n";
        let at = locate_key(content, &["provider"], "timout_secs").unwrap();
        assert_eq!(&content[at..at + 11], "timout_secs");
    }

    #[test]
    fn prefix_of_longer_key_is_not_a_match() {
        let content = "[gateway]\nportal = 1\nport = 2\n";
        let at = locate_key(content, &["gateway"], "port").unwrap();
        assert!(content[at..].starts_with("port = 2"));
    }

    #[test]
    fn absent_section_has_no_location() {
        let content = "[service]\nname = \"x\"\n";
        assert_eq!(locate_key(content, &["gateway"], "port"), None);
    }
}
