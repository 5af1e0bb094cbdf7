// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval ranking over one tenant's knowledge index.
//!
//! Each entry is scored as
//! `keyword_weight * keyword_overlap + text_weight * max(sim(question), sim(answer))`.
//! The best entry wins with strict `>`, so ties keep the earliest entry in
//! index order. A candidate is accepted only when its score exceeds the
//! acceptance threshold.

use std::sync::Arc;

use answerdesk_config::model::RetrievalConfig;
use answerdesk_core::{KnowledgeEntry, RetrievalResult};
use tracing::debug;

use crate::index::KnowledgeIndex;
use crate::keywords::extract;
use crate::similarity::{keyword_overlap, text_similarity};

/// Scores queries against knowledge entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetrievalRanker {
    config: RetrievalConfig,
}

impl RetrievalRanker {
    pub fn new(config: RetrievalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Rank `query` against the current snapshot of `index`.
    pub fn rank(&self, query: &str, index: &KnowledgeIndex) -> RetrievalResult {
        let snapshot = index.all();
        let result = self.rank_entries(query, &snapshot);
        debug!(
            chatbot_id = index.chatbot_id(),
            candidates = snapshot.len(),
            score = result.score,
            accepted = result.accepted,
            "ranked query"
        );
        result
    }

    /// Rank `query` against an explicit entry list, in the given order.
    pub fn rank_entries(&self, query: &str, entries: &[Arc<KnowledgeEntry>]) -> RetrievalResult {
        let query_keywords = extract(query);
        if query_keywords.is_empty() {
            return RetrievalResult::no_match();
        }

        let mut best: Option<(&Arc<KnowledgeEntry>, f64)> = None;
        for entry in entries.iter().filter(|e| !e.keywords.is_empty()) {
            let score = self.score(query, &query_keywords, entry);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((entry, score));
            }
        }

        match best {
            Some((entry, score)) => RetrievalResult {
                matched_entry: Some(Arc::clone(entry)),
                score,
                accepted: score > self.config.acceptance_threshold,
            },
            None => RetrievalResult::no_match(),
        }
    }

    fn score(
        &self,
        query: &str,
        query_keywords: &std::collections::BTreeSet<String>,
        entry: &KnowledgeEntry,
    ) -> f64 {
        let overlap = keyword_overlap(query_keywords, &entry.keywords);
        let text = text_similarity(query, &entry.question).max(text_similarity(query, &entry.answer));
        self.config.keyword_weight * overlap + self.config.text_weight * text
    }
}
