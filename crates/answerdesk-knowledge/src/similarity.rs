// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lexical similarity measures. Both return scores in `[0, 1]` and never NaN.

use std::collections::{BTreeSet, HashSet};

use crate::keywords::tokenize;

/// Jaccard similarity of the lower-cased word sets of `a` and `b`.
///
/// Uses the extractor's tokenisation without length or stop-word filtering.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let left: HashSet<String> = tokenize(a).collect();
    let right: HashSet<String> = tokenize(b).collect();
    if left.is_empty() && right.is_empty() {
        return 0.0;
    }
    let intersection = left.intersection(&right).count();
    let union = left.union(&right).count();
    intersection as f64 / union as f64
}

/// Fraction of entry keywords that partially match some query keyword.
///
/// An entry keyword matches when a query keyword is a substring of it or it
/// is a substring of a query keyword. The count is divided by the larger of
/// the two set sizes.
pub fn keyword_overlap(query: &BTreeSet<String>, entry: &BTreeSet<String>) -> f64 {
    if query.is_empty() || entry.is_empty() {
        return 0.0;
    }
    let matched = entry
        .iter()
        .filter(|ek| {
            query
                .iter()
                .any(|qk| ek.contains(qk.as_str()) || qk.contains(ek.as_str()))
        })
        .count();
    matched as f64 / entry.len().max(query.len()) as f64
}
