// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Answerdesk - a multi-tenant support chatbot response engine.
//!
//! This is the binary entry point: the HTTP server plus a handful of
//! administrative commands that work directly against the database.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod serve;

use std::path::PathBuf;

use answerdesk_config::AnswerdeskConfig;
use clap::{Parser, Subcommand};

/// Answerdesk - a multi-tenant support chatbot response engine.
#[derive(Parser, Debug)]
#[command(name = "answerdesk", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Manage chatbots.
    #[command(subcommand)]
    Chatbot(ChatbotCommand),
    /// Manage a chatbot's knowledge base.
    #[command(subcommand)]
    Kb(KbCommand),
    /// Ask a chatbot a question.
    Ask {
        chatbot: String,
        text: String,
        /// Continue an existing session instead of starting a new one.
        #[arg(long)]
        session: Option<String>,
    },
    /// Print a session transcript.
    Transcript { session: String },
}

#[derive(Subcommand, Debug)]
enum ChatbotCommand {
    /// Register a new chatbot and print its id.
    Create {
        name: String,
        /// Persona handed to the provider as system prompt.
        #[arg(long)]
        system_prompt: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum KbCommand {
    /// Import question/answer pairs from a CSV file.
    Import { chatbot: String, file: PathBuf },
    /// List a chatbot's knowledge entries, newest first.
    List { chatbot: String },
}

fn load_config(path: Option<&PathBuf>) -> AnswerdeskConfig {
    let loaded = match path {
        Some(path) => answerdesk_config::load_and_validate_path(path),
        None => answerdesk_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            answerdesk_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());
    serve::init_tracing(&config.service.log_level);

    let result = match cli.command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Chatbot(ChatbotCommand::Create {
            name,
            system_prompt,
        }) => commands::run_chatbot_create(&config, &name, system_prompt).await,
        Commands::Kb(KbCommand::Import { chatbot, file }) => {
            commands::run_kb_import(&config, &chatbot, &file).await
        }
        Commands::Kb(KbCommand::List { chatbot }) => commands::run_kb_list(&config, &chatbot).await,
        Commands::Ask {
            chatbot,
            text,
            session,
        } => commands::run_ask(&config, &chatbot, &text, session.as_deref()).await,
        Commands::Transcript { session } => commands::run_transcript(&config, &session).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = answerdesk_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.service.name, "answerdesk");
    }

    #[test]
    fn parses_ask_with_session() {
        let cli = Cli::try_parse_from([
            "answerdesk",
            "ask",
            "bot-1",
            "What time do you open?",
            "--session",
            "s-1",
        ])
        .unwrap();
        match cli.command {
            Commands::Ask {
                chatbot,
                text,
                session,
            } => {
                assert_eq!(chatbot, "bot-1");
                assert_eq!(text, "What time do you open?");
                assert_eq!(session.as_deref(), Some("s-1"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_nested_kb_import_with_global_config() {
        let cli = Cli::try_parse_from([
            "answerdesk",
            "kb",
            "import",
            "bot-1",
            "faq.csv",
            "--config",
            "/tmp/answerdesk.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/answerdesk.toml")));
        assert!(matches!(
            cli.command,
            Commands::Kb(KbCommand::Import { ref chatbot, .. }) if chatbot == "bot-1"
        ));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["answerdesk"]).is_err());
    }
}
