// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Administrative subcommands that operate on the database directly.
//!
//! Each `run_*` function opens storage from the configuration, does its work,
//! prints to stdout, and checkpoints the database before returning. The
//! storage-level helpers below them are what the tests exercise.

use std::path::Path;
use std::sync::Arc;

use answerdesk_agent::{ResponseOrchestrator, build_provider};
use answerdesk_config::AnswerdeskConfig;
use answerdesk_core::{
    AnswerdeskError, Chatbot, KnowledgeEntry, Message, ResolvedAnswer, StorageAdapter,
};
use answerdesk_knowledge::{KnowledgeRegistry, read_csv_path};
use tracing::warn;

use crate::serve::open_storage;

/// Identity recorded on sessions started from the command line.
const CLI_USER_IDENTITY: &str = "cli";

pub async fn run_chatbot_create(
    config: &AnswerdeskConfig,
    name: &str,
    system_prompt: Option<String>,
) -> Result<(), AnswerdeskError> {
    let storage = open_storage(config).await?;
    let result = create_chatbot(storage.as_ref(), name, system_prompt).await;
    finish(storage, result).await.map(|chatbot| {
        println!("{}", chatbot.id);
    })
}

pub async fn run_kb_import(
    config: &AnswerdeskConfig,
    chatbot_id: &str,
    file: &Path,
) -> Result<(), AnswerdeskError> {
    let storage = open_storage(config).await?;
    let result = import_knowledge(storage.clone(), chatbot_id, file).await;
    finish(storage, result).await.map(|count| {
        println!("imported {count} entries into {chatbot_id}");
    })
}

pub async fn run_kb_list(config: &AnswerdeskConfig, chatbot_id: &str) -> Result<(), AnswerdeskError> {
    let storage = open_storage(config).await?;
    let result = list_knowledge(storage.as_ref(), chatbot_id).await;
    finish(storage, result).await.map(|entries| {
        for entry in &entries {
            println!("{}", format_entry(entry));
        }
    })
}

pub async fn run_ask(
    config: &AnswerdeskConfig,
    chatbot_id: &str,
    text: &str,
    session_id: Option<&str>,
) -> Result<(), AnswerdeskError> {
    let storage = open_storage(config).await?;
    let result = match build_provider(config) {
        Ok(provider) => {
            let orchestrator = ResponseOrchestrator::from_config(config, storage.clone(), provider);
            ask(&orchestrator, chatbot_id, text, session_id).await
        }
        Err(e) => Err(e),
    };
    finish(storage, result).await.map(|(session_id, answer)| {
        println!("{}", answer.content);
        eprintln!("[session {session_id}, source {}]", answer.source);
    })
}

pub async fn run_transcript(config: &AnswerdeskConfig, session_id: &str) -> Result<(), AnswerdeskError> {
    let storage = open_storage(config).await?;
    let result = transcript(storage.as_ref(), session_id).await;
    finish(storage, result).await.map(|messages| {
        for message in &messages {
            println!("{}", format_message(message));
        }
    })
}

/// Checkpoint storage, then hand back the command result.
async fn finish<T>(
    storage: Arc<dyn StorageAdapter>,
    result: Result<T, AnswerdeskError>,
) -> Result<T, AnswerdeskError> {
    if let Err(e) = storage.close().await {
        warn!(error = %e, "failed to close storage cleanly");
    }
    result
}

async fn create_chatbot(
    storage: &dyn StorageAdapter,
    name: &str,
    system_prompt: Option<String>,
) -> Result<Chatbot, AnswerdeskError> {
    if name.trim().is_empty() {
        return Err(AnswerdeskError::Input("chatbot name must not be blank".into()));
    }
    let system_prompt = system_prompt.filter(|p| !p.trim().is_empty());
    let chatbot = Chatbot::new(name.trim(), system_prompt);
    storage.create_chatbot(&chatbot).await?;
    Ok(chatbot)
}

async fn require_chatbot(storage: &dyn StorageAdapter, chatbot_id: &str) -> Result<Chatbot, AnswerdeskError> {
    storage
        .get_chatbot(chatbot_id)
        .await?
        .ok_or_else(|| AnswerdeskError::not_found("chatbot", chatbot_id))
}

async fn import_knowledge(
    storage: Arc<dyn StorageAdapter>,
    chatbot_id: &str,
    file: &Path,
) -> Result<usize, AnswerdeskError> {
    require_chatbot(storage.as_ref(), chatbot_id).await?;
    let drafts = read_csv_path(file)?;
    KnowledgeRegistry::new(storage).import(chatbot_id, drafts).await
}

async fn list_knowledge(
    storage: &dyn StorageAdapter,
    chatbot_id: &str,
) -> Result<Vec<KnowledgeEntry>, AnswerdeskError> {
    require_chatbot(storage, chatbot_id).await?;
    storage.load_entries_for_tenant(chatbot_id).await
}

/// Resolve one question, starting a session when none is given.
async fn ask(
    orchestrator: &ResponseOrchestrator,
    chatbot_id: &str,
    text: &str,
    session_id: Option<&str>,
) -> Result<(String, ResolvedAnswer), AnswerdeskError> {
    let session_id = match session_id {
        Some(id) => id.to_string(),
        None => orchestrator.start_session(chatbot_id, CLI_USER_IDENTITY).await?.id,
    };
    let answer = orchestrator.resolve(chatbot_id, &session_id, text).await?;
    Ok((session_id, answer))
}

async fn transcript(storage: &dyn StorageAdapter, session_id: &str) -> Result<Vec<Message>, AnswerdeskError> {
    if storage.get_session(session_id).await?.is_none() {
        return Err(AnswerdeskError::not_found("session", session_id));
    }
    storage.get_messages(session_id, None).await
}

fn format_entry(entry: &KnowledgeEntry) -> String {
    let category = entry.category.as_deref().unwrap_or("-");
    format!("{}\t{}\t{}", entry.id, category, entry.question)
}

fn format_message(message: &Message) -> String {
    format!("[{}] {}: {}", message.created_at, message.role, message.content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use answerdesk_config::model::StorageConfig;
    use answerdesk_storage::SqliteStorage;
    use tempfile::{NamedTempFile, TempDir};

    async fn temp_storage() -> (TempDir, Arc<dyn StorageAdapter>) {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("cli.db").to_string_lossy().into_owned(),
            wal_mode: true,
        });
        storage.initialize().await.unwrap();
        (dir, Arc::new(storage))
    }

    fn faq_csv() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "question,answer,category,keywords").unwrap();
        writeln!(
            file,
            "What are your opening hours?,We are open 9am to 5pm Monday to Friday.,hours,hours;open"
        )
        .unwrap();
        writeln!(file, "Do you ship abroad?,Yes we ship to most countries.,shipping,").unwrap();
        file
    }

    #[tokio::test]
    async fn create_chatbot_trims_name_and_drops_blank_prompt() {
        let (_dir, storage) = temp_storage().await;
        let bot = create_chatbot(storage.as_ref(), "  Acme  ", Some("   ".into()))
            .await
            .unwrap();
        assert_eq!(bot.name, "Acme");
        assert!(bot.system_prompt.is_none());

        let stored = storage.get_chatbot(&bot.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Acme");
    }

    #[tokio::test]
    async fn create_chatbot_rejects_blank_name() {
        let (_dir, storage) = temp_storage().await;
        let err = create_chatbot(storage.as_ref(), " ", None).await.unwrap_err();
        assert!(matches!(err, AnswerdeskError::Input(_)));
    }

    #[tokio::test]
    async fn import_then_list_knowledge() {
        let (_dir, storage) = temp_storage().await;
        let bot = create_chatbot(storage.as_ref(), "Acme", None).await.unwrap();
        let csv = faq_csv();

        let count = import_knowledge(storage.clone(), &bot.id, csv.path()).await.unwrap();
        assert_eq!(count, 2);

        let entries = list_knowledge(storage.as_ref(), &bot.id).await.unwrap();
        assert_eq!(entries.len(), 2);
        let hours = entries
            .iter()
            .find(|e| e.category.as_deref() == Some("hours"))
            .unwrap();
        assert!(hours.keywords.contains("hours"));
        assert!(format_entry(hours).ends_with("What are your opening hours?"));
    }

    #[tokio::test]
    async fn import_into_unknown_chatbot_is_not_found() {
        let (_dir, storage) = temp_storage().await;
        let csv = faq_csv();
        let err = import_knowledge(storage, "missing", csv.path()).await.unwrap_err();
        assert!(matches!(err, AnswerdeskError::NotFound { .. }));
    }

    #[tokio::test]
    async fn import_missing_file_is_input_error() {
        let (dir, storage) = temp_storage().await;
        let bot = create_chatbot(storage.as_ref(), "Acme", None).await.unwrap();
        let err = import_knowledge(storage, &bot.id, &dir.path().join("nope.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, AnswerdeskError::Input(_)));
    }

    #[tokio::test]
    async fn transcript_of_unknown_session_is_not_found() {
        let (_dir, storage) = temp_storage().await;
        let err = transcript(storage.as_ref(), "nope").await.unwrap_err();
        assert!(matches!(err, AnswerdeskError::NotFound { .. }));
    }

    #[tokio::test]
    async fn ask_starts_a_session_and_continues_it() {
        use answerdesk_core::ResponseSource;
        use answerdesk_test_utils::MockProvider;

        let (_dir, storage) = temp_storage().await;
        let bot = create_chatbot(storage.as_ref(), "Acme", Some("You are Acme support.".into()))
            .await
            .unwrap();
        let provider = Arc::new(MockProvider::with_responses(vec![
            "first".into(),
            "second".into(),
        ]));
        let orchestrator = ResponseOrchestrator::from_config(
            &AnswerdeskConfig::default(),
            storage.clone(),
            provider,
        );

        let (session_id, answer) = ask(&orchestrator, &bot.id, "hello there", None).await.unwrap();
        assert_eq!(answer.content, "first");
        assert_eq!(answer.source, ResponseSource::Generative);

        let (same, answer) = ask(&orchestrator, &bot.id, "and again", Some(&session_id))
            .await
            .unwrap();
        assert_eq!(same, session_id);
        assert_eq!(answer.content, "second");

        let messages = transcript(storage.as_ref(), &session_id).await.unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(
            format_message(&messages[3]),
            format!("[{}] assistant: second", messages[3].created_at)
        );
    }

    #[test]
    fn message_line_shows_role_and_content() {
        let message = Message::user("s-1", "hello");
        let line = format_message(&message);
        assert!(line.ends_with("user: hello"), "{line}");
    }
}
