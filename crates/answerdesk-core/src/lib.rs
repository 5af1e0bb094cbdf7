// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Answerdesk response engine.
//!
//! This crate provides the domain types, error types, and adapter traits
//! shared by the knowledge, provider, storage, and orchestration crates.

pub mod error;
pub mod prompt;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{AnswerdeskError, ProviderError};
pub use types::{
    AdapterType, ChatTurn, Chatbot, GenerateRequest, GeneratedAnswer, HealthStatus,
    KnowledgeEntry, Message, ProviderResponse, ResolvedAnswer, ResponseSource, RetrievalResult,
    Role, Session,
};

pub use traits::{PluginAdapter, ProviderAdapter, StorageAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_type_round_trips_through_display() {
        use std::str::FromStr;

        for variant in [AdapterType::Provider, AdapterType::Storage] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn all_traits_are_object_safe() {
        fn _provider(_: &dyn ProviderAdapter) {}
        fn _storage(_: &dyn StorageAdapter) {}
        fn _plugin(_: &dyn PluginAdapter) {}
    }
}
