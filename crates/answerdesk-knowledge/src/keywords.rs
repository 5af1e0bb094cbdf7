// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword extraction.
//!
//! Text is lower-cased, split on whitespace, and each token is trimmed of
//! non-alphanumeric characters at both ends. Extraction then drops short
//! tokens and stop-words.

use std::collections::BTreeSet;

/// Tokens at or below this many characters are never keywords.
pub const MIN_KEYWORD_CHARS: usize = 3;

/// Articles, conjunctions and common prepositions.
///
/// Most of these are already removed by length. Longer function words such
/// as "what" or "your" stay keywords.
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "with", "by", "about",
];

/// Lower-cased, edge-trimmed word tokens. Empty tokens are skipped.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().filter_map(|raw| {
        let token = raw
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        (!token.is_empty()).then_some(token)
    })
}

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Extract the keyword set of `text`.
pub fn extract(text: &str) -> BTreeSet<String> {
    tokenize(text)
        .filter(|t| t.chars().count() > MIN_KEYWORD_CHARS && !is_stop_word(t))
        .collect()
}

/// Keywords for a new knowledge entry.
///
/// Falls back to the plain word tokens when extraction finds nothing, so
/// non-empty text never produces an empty keyword set.
pub fn derive_keywords(text: &str) -> BTreeSet<String> {
    let keywords = extract(text);
    if keywords.is_empty() {
        tokenize(text).collect()
    } else {
        keywords
    }
}

/// Normalise caller-supplied keywords: trimmed, lower-cased, de-duplicated, no blanks.
pub fn normalize_keywords<I, S>(keywords: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}
