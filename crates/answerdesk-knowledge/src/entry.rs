// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Construction of new knowledge entries.

use answerdesk_core::types::{new_id, now_timestamp};
use answerdesk_core::{AnswerdeskError, KnowledgeEntry};
use serde::Deserialize;

use crate::keywords::{derive_keywords, normalize_keywords};

/// A knowledge entry before it is assigned an id and owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EntryDraft {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    /// Explicit keywords. Derived from question and answer when absent or blank.
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub source_document_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl EntryDraft {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            ..Self::default()
        }
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = Some(keywords.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Validate the draft and turn it into an entry owned by `chatbot_id`.
    pub fn into_entry(self, chatbot_id: &str) -> Result<KnowledgeEntry, AnswerdeskError> {
        let question = self.question.trim().to_string();
        let answer = self.answer.trim().to_string();
        if chatbot_id.trim().is_empty() {
            return Err(AnswerdeskError::Input("chatbot id must not be blank".into()));
        }
        if question.is_empty() {
            return Err(AnswerdeskError::Input("question must not be blank".into()));
        }
        if answer.is_empty() {
            return Err(AnswerdeskError::Input("answer must not be blank".into()));
        }

        let explicit = self
            .keywords
            .map(normalize_keywords)
            .filter(|k| !k.is_empty());
        let keywords = explicit.unwrap_or_else(|| derive_keywords(&format!("{question} {answer}")));

        Ok(KnowledgeEntry {
            id: new_id(),
            chatbot_id: Some(chatbot_id.to_string()),
            question,
            answer,
            category: non_blank(self.category),
            subcategory: non_blank(self.subcategory),
            keywords,
            source_document_id: non_blank(self.source_document_id),
            metadata: self.metadata.map(|m| m.to_string()),
            created_at: now_timestamp(),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_keywords_from_question_and_answer() {
        let entry = EntryDraft::new("What are your opening hours?", "9 to 5")
            .into_entry("bot")
            .unwrap();
        let kws: Vec<&str> = entry.keywords.iter().map(String::as_str).collect();
        assert_eq!(kws, vec!["hours", "opening", "what", "your"]);
        assert_eq!(entry.chatbot_id.as_deref(), Some("bot"));
    }

    #[test]
    fn explicit_keywords_are_normalised() {
        let entry = EntryDraft::new("Q?", "A.")
            .with_keywords([" Refund ", "REFUND", "returns"])
            .into_entry("bot")
            .unwrap();
        let kws: Vec<&str> = entry.keywords.iter().map(String::as_str).collect();
        assert_eq!(kws, vec!["refund", "returns"]);
    }

    #[test]
    fn blank_explicit_keywords_fall_back_to_derivation() {
        let entry = EntryDraft::new("Do you ship abroad?", "Yes, worldwide.")
            .with_keywords(["  ", ""])
            .into_entry("bot")
            .unwrap();
        assert!(entry.keywords.contains("ship") || entry.keywords.contains("abroad"));
    }

    #[test]
    fn short_text_still_gets_keywords() {
        let entry = EntryDraft::new("Wifi?", "Yes").into_entry("bot").unwrap();
        assert!(!entry.keywords.is_empty());
        let entry = EntryDraft::new("Tax?", "No").into_entry("bot").unwrap();
        let kws: Vec<&str> = entry.keywords.iter().map(String::as_str).collect();
        assert_eq!(kws, vec!["no", "tax"]);
    }

    #[test]
    fn blank_fields_are_rejected() {
        assert!(matches!(
            EntryDraft::new("  ", "answer").into_entry("bot"),
            Err(AnswerdeskError::Input(_))
        ));
        assert!(matches!(
            EntryDraft::new("question", "").into_entry("bot"),
            Err(AnswerdeskError::Input(_))
        ));
        assert!(matches!(
            EntryDraft::new("question", "answer").into_entry(" "),
            Err(AnswerdeskError::Input(_))
        ));
    }

    #[test]
    fn blank_category_becomes_none() {
        let entry = EntryDraft::new("q", "a")
            .with_category("  ")
            .into_entry("bot")
            .unwrap();
        assert!(entry.category.is_none());
    }
}
