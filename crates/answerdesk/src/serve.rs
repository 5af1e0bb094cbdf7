// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `answerdesk serve` command implementation.
//!
//! Opens SQLite storage, builds the configured provider, wires the response
//! orchestrator, and runs the HTTP gateway until SIGINT or SIGTERM.

use std::sync::Arc;

use answerdesk_agent::{ResponseOrchestrator, build_provider};
use answerdesk_config::AnswerdeskConfig;
use answerdesk_core::{AnswerdeskError, StorageAdapter};
use answerdesk_gateway::{GatewayState, start_server};
use answerdesk_storage::SqliteStorage;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Runs the `answerdesk serve` command.
pub async fn run_serve(config: AnswerdeskConfig) -> Result<(), AnswerdeskError> {
    let storage = open_storage(&config).await?;
    let provider = build_provider(&config)?;
    info!(
        provider = config.provider.kind.as_str(),
        timeout_secs = config.provider.timeout_secs,
        "provider initialized"
    );

    let orchestrator = Arc::new(ResponseOrchestrator::from_config(
        &config,
        storage.clone(),
        provider,
    ));
    let state = GatewayState::new(orchestrator);

    let cancel = install_signal_handler();
    let shutdown = {
        let cancel = cancel.clone();
        async move { cancel.cancelled().await }
    };

    info!(name = %config.service.name, "answerdesk is ready");
    let served = start_server(&config.gateway, state, shutdown).await;

    if let Err(e) = storage.close().await {
        warn!(error = %e, "failed to close storage cleanly");
    }
    info!("answerdesk shutdown complete");
    served
}

/// Opens and migrates the configured SQLite database.
pub async fn open_storage(config: &AnswerdeskConfig) -> Result<Arc<dyn StorageAdapter>, AnswerdeskError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    Ok(Arc::new(storage))
}

/// Installs handlers for SIGTERM and SIGINT.
///
/// The returned token is cancelled when either signal arrives.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating shutdown"),
                        _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler, only Ctrl+C is honored");
                    let _ = ctrl_c.await;
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
    });

    token
}

/// Initialize the tracing subscriber with the configured log level.
///
/// `RUST_LOG` takes precedence when set. Output goes to stderr so command
/// results on stdout stay machine-readable.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("answerdesk={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
