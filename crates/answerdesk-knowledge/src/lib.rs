// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lexical knowledge retrieval for the Answerdesk response engine.
//!
//! Curated question/answer entries are matched against incoming messages with
//! a blend of keyword overlap and Jaccard word similarity. Each tenant gets its
//! own [`KnowledgeIndex`], kept by a [`KnowledgeRegistry`] and swapped
//! atomically on reload.

pub mod entry;
pub mod import;
pub mod index;
pub mod keywords;
pub mod ranker;
pub mod registry;
pub mod similarity;

pub use entry::EntryDraft;
pub use import::{read_csv, read_csv_path, ImportError};
pub use index::KnowledgeIndex;
pub use keywords::extract;
pub use ranker::RetrievalRanker;
pub use registry::KnowledgeRegistry;
pub use similarity::{keyword_overlap, text_similarity};
