// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response orchestration for one incoming end-user message.
//!
//! Each call to [`ResponseOrchestrator::resolve`] walks a fixed sequence:
//! Received -> UserPersisted -> (KnowledgeMatched | GenerativeAttempted)
//! -> AssistantPersisted -> Returned.
//!
//! Exactly one user turn and one assistant turn are persisted per call once
//! validation has passed, whatever happens on the answering path.

use std::sync::Arc;

use answerdesk_config::AnswerdeskConfig;
use answerdesk_core::types::format_timestamp;
use answerdesk_core::{
    AnswerdeskError, ChatTurn, Chatbot, Message, ProviderAdapter, ResolvedAnswer, ResponseSource,
    Session, StorageAdapter,
};
use answerdesk_knowledge::{KnowledgeRegistry, RetrievalRanker};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::provider_gateway::ProviderGateway;

/// Sent when the tenant has no persona configured. No provider is called.
pub const NO_PERSONA_FALLBACK: &str =
    "I'm sorry, I don't have enough information to answer that right now.";

/// Sent when the answering path fails unexpectedly.
pub const RECOVERY_FALLBACK: &str = "I'm here to help! What would you like to know more about?";

/// Steps of a single `resolve` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveState {
    Received,
    UserPersisted,
    KnowledgeMatched,
    GenerativeAttempted,
    AssistantPersisted,
    Returned,
}

impl std::fmt::Display for ResolveState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveState::Received => write!(f, "received"),
            ResolveState::UserPersisted => write!(f, "user_persisted"),
            ResolveState::KnowledgeMatched => write!(f, "knowledge_matched"),
            ResolveState::GenerativeAttempted => write!(f, "generative_attempted"),
            ResolveState::AssistantPersisted => write!(f, "assistant_persisted"),
            ResolveState::Returned => write!(f, "returned"),
        }
    }
}

/// The assistant turn chosen on the answering path, before persistence.
#[derive(Debug)]
struct Reply {
    content: String,
    source: ResponseSource,
    is_from_ai: bool,
    confidence: Option<f64>,
    matched_entry_id: Option<String>,
    provider: Option<String>,
    provider_succeeded: Option<bool>,
    path: &'static str,
}

impl Reply {
    fn fallback(content: &str, path: &'static str) -> Self {
        Self {
            content: content.to_string(),
            source: ResponseSource::Generative,
            is_from_ai: false,
            confidence: None,
            matched_entry_id: None,
            provider: None,
            provider_succeeded: None,
            path,
        }
    }

    fn metadata(&self) -> serde_json::Value {
        json!({
            "path": self.path,
            "score": self.confidence,
            "matched_entry_id": self.matched_entry_id,
            "provider": self.provider,
            "succeeded": self.provider_succeeded,
        })
    }

    fn into_answer(self) -> ResolvedAnswer {
        ResolvedAnswer {
            content: self.content,
            source: self.source,
            is_from_ai: self.is_from_ai,
            confidence: self.confidence,
            matched_entry_id: self.matched_entry_id,
            provider: self.provider,
        }
    }
}

/// Turns one end-user message into one persisted, provenance-tagged answer.
///
/// `Send + Sync`; share it behind an `Arc`.
pub struct ResponseOrchestrator {
    storage: Arc<dyn StorageAdapter>,
    knowledge: Arc<KnowledgeRegistry>,
    ranker: RetrievalRanker,
    gateway: ProviderGateway,
    forward_history: bool,
    history_window: usize,
}

impl ResponseOrchestrator {
    /// Orchestrator with default retrieval settings and no history forwarding.
    pub fn new(storage: Arc<dyn StorageAdapter>, gateway: ProviderGateway) -> Self {
        let knowledge = Arc::new(KnowledgeRegistry::new(Arc::clone(&storage)));
        Self {
            storage,
            knowledge,
            ranker: RetrievalRanker::default(),
            gateway,
            forward_history: false,
            history_window: answerdesk_core::prompt::DEFAULT_HISTORY_WINDOW,
        }
    }

    /// Orchestrator wired from the loaded configuration.
    pub fn from_config(
        config: &AnswerdeskConfig,
        storage: Arc<dyn StorageAdapter>,
        provider: Arc<dyn ProviderAdapter>,
    ) -> Self {
        let gateway = ProviderGateway::from_config(provider, &config.provider);
        Self::new(storage, gateway)
            .with_ranker(RetrievalRanker::new(config.retrieval))
            .with_forward_history(config.provider.forward_history, config.provider.history_window)
    }

    pub fn with_ranker(mut self, ranker: RetrievalRanker) -> Self {
        self.ranker = ranker;
        self
    }

    /// Share an existing registry instead of the private one built by [`Self::new`].
    pub fn with_knowledge(mut self, knowledge: Arc<KnowledgeRegistry>) -> Self {
        self.knowledge = knowledge;
        self
    }

    /// Forward up to `window` prior turns to the provider.
    pub fn with_forward_history(mut self, enabled: bool, window: usize) -> Self {
        self.forward_history = enabled;
        self.history_window = window;
        self
    }

    pub fn storage(&self) -> &Arc<dyn StorageAdapter> {
        &self.storage
    }

    pub fn knowledge(&self) -> &Arc<KnowledgeRegistry> {
        &self.knowledge
    }

    pub fn gateway(&self) -> &ProviderGateway {
        &self.gateway
    }

    /// Answer `text` for the given tenant and session.
    ///
    /// Errors only on invalid input (nothing persisted) or when a transcript
    /// write fails. Provider trouble is always answered with content.
    pub async fn resolve(
        &self,
        chatbot_id: &str,
        session_id: &str,
        text: &str,
    ) -> Result<ResolvedAnswer, AnswerdeskError> {
        if text.trim().is_empty() {
            return Err(AnswerdeskError::Input("message text must not be blank".into()));
        }
        let chatbot = self.chatbot(chatbot_id).await?;
        let session = self.session_for(chatbot_id, session_id).await?;
        if !session.is_active {
            return Err(AnswerdeskError::Input(format!("session {session_id} has ended")));
        }
        trace_state(&session.id, ResolveState::Received);

        let user = self.storage.insert_message(&Message::user(&session.id, text)).await?;
        trace_state(&session.id, ResolveState::UserPersisted);

        let reply = match self.answer(&chatbot, &session, &user).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    chatbot_id = %chatbot.id,
                    session_id = %session.id,
                    error = %e,
                    "answering failed, sending recovery reply"
                );
                Reply::fallback(RECOVERY_FALLBACK, "recovered")
            }
        };

        let mut assistant = Message::assistant(&session.id, &reply.content, reply.source)
            .with_metadata(reply.metadata());
        assistant.created_at = timestamp_after(&user.created_at);
        self.storage.insert_message(&assistant).await?;
        trace_state(&session.id, ResolveState::AssistantPersisted);

        info!(
            chatbot_id = %chatbot.id,
            session_id = %session.id,
            source = %reply.source,
            score = reply.confidence,
            provider = reply.provider.as_deref(),
            "message resolved"
        );
        trace_state(&session.id, ResolveState::Returned);
        Ok(reply.into_answer())
    }

    /// Steps 2 to 5: persona gate, retrieval, generation.
    async fn answer(
        &self,
        chatbot: &Chatbot,
        session: &Session,
        user: &Message,
    ) -> Result<Reply, AnswerdeskError> {
        let Some(persona) = chatbot.persona() else {
            debug!(chatbot_id = %chatbot.id, "no persona configured");
            return Ok(Reply::fallback(NO_PERSONA_FALLBACK, "no_persona"));
        };

        let index = self.knowledge.index_for(&chatbot.id).await?;
        let ranked = self.ranker.rank(&user.content, &index);
        debug!(
            chatbot_id = %chatbot.id,
            score = ranked.score,
            accepted = ranked.accepted,
            candidates = index.len(),
            "knowledge ranked"
        );

        if let Some(entry) = ranked.accepted_entry() {
            trace_state(&session.id, ResolveState::KnowledgeMatched);
            return Ok(Reply {
                content: entry.answer.clone(),
                source: ResponseSource::KnowledgeBase,
                is_from_ai: false,
                confidence: Some(ranked.score),
                matched_entry_id: Some(entry.id.clone()),
                provider: None,
                provider_succeeded: None,
                path: "knowledge_base",
            });
        }

        let history = if self.forward_history {
            self.prior_turns(&session.id, &user.id).await?
        } else {
            Vec::new()
        };

        let response = self.gateway.generate(persona, history, &user.content).await;
        trace_state(&session.id, ResolveState::GenerativeAttempted);
        Ok(Reply {
            content: response.content,
            source: ResponseSource::Generative,
            is_from_ai: true,
            confidence: Some(ranked.score),
            matched_entry_id: None,
            provider: Some(response.provider_name),
            provider_succeeded: Some(response.succeeded),
            path: "generative",
        })
    }

    /// The last `history_window` turns before the current user message.
    async fn prior_turns(
        &self,
        session_id: &str,
        current_id: &str,
    ) -> Result<Vec<ChatTurn>, AnswerdeskError> {
        let limit = i64::try_from(self.history_window + 1).unwrap_or(i64::MAX);
        let messages = self.storage.get_messages(session_id, Some(limit)).await?;
        Ok(messages
            .iter()
            .filter(|m| m.id != current_id)
            .map(ChatTurn::from)
            .collect())
    }

    /// Open a session for an end user of an existing chatbot.
    pub async fn start_session(
        &self,
        chatbot_id: &str,
        user_identity: &str,
    ) -> Result<Session, AnswerdeskError> {
        if user_identity.trim().is_empty() {
            return Err(AnswerdeskError::Input("user identity must not be blank".into()));
        }
        let chatbot = self.chatbot(chatbot_id).await?;
        let session = Session::new(&chatbot.id, user_identity.trim());
        self.storage.create_session(&session).await?;
        info!(chatbot_id = %chatbot.id, session_id = %session.id, "session started");
        Ok(session)
    }

    /// Mark a session of `chatbot_id` inactive. Ending twice is not an error.
    pub async fn end_session(&self, chatbot_id: &str, session_id: &str) -> Result<(), AnswerdeskError> {
        let session = self.session_for(chatbot_id, session_id).await?;
        if session.is_active {
            self.storage.end_session(&session.id).await?;
            info!(chatbot_id, session_id, "session ended");
        }
        Ok(())
    }

    /// A session's messages in transcript order, optionally only the last `limit`.
    pub async fn transcript(
        &self,
        session_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, AnswerdeskError> {
        if self.storage.get_session(session_id).await?.is_none() {
            return Err(AnswerdeskError::not_found("session", session_id));
        }
        self.storage.get_messages(session_id, limit).await
    }

    /// Register a tenant. `persona` may be left unset until onboarding finishes.
    pub async fn create_chatbot(
        &self,
        name: &str,
        persona: Option<String>,
    ) -> Result<Chatbot, AnswerdeskError> {
        if name.trim().is_empty() {
            return Err(AnswerdeskError::Input("chatbot name must not be blank".into()));
        }
        let chatbot = Chatbot::new(name.trim(), persona);
        self.storage.create_chatbot(&chatbot).await?;
        info!(chatbot_id = %chatbot.id, name = %chatbot.name, "chatbot created");
        Ok(chatbot)
    }

    /// Look up a tenant, rejecting blank and unknown ids.
    pub async fn chatbot(&self, chatbot_id: &str) -> Result<Chatbot, AnswerdeskError> {
        if chatbot_id.trim().is_empty() {
            return Err(AnswerdeskError::Input("chatbot id must not be blank".into()));
        }
        self.storage
            .get_chatbot(chatbot_id)
            .await?
            .ok_or_else(|| AnswerdeskError::not_found("chatbot", chatbot_id))
    }

    /// Look up a session and check it belongs to `chatbot_id`. Ended sessions are returned.
    pub async fn session_for(
        &self,
        chatbot_id: &str,
        session_id: &str,
    ) -> Result<Session, AnswerdeskError> {
        if session_id.trim().is_empty() {
            return Err(AnswerdeskError::Input("session id must not be blank".into()));
        }
        let session = self
            .storage
            .get_session(session_id)
            .await?
            .ok_or_else(|| AnswerdeskError::not_found("session", session_id))?;
        if session.chatbot_id != chatbot_id {
            return Err(AnswerdeskError::Input(format!(
                "session {session_id} does not belong to chatbot {chatbot_id}"
            )));
        }
        Ok(session)
    }
}

fn trace_state(session_id: &str, state: ResolveState) {
    debug!(session_id, state = %state, "resolve transition");
}

/// The current time, nudged forward so it sorts strictly after `previous`.
fn timestamp_after(previous: &str) -> String {
    let now = Utc::now();
    match DateTime::parse_from_rfc3339(previous) {
        Ok(prev) => {
            let prev = prev.with_timezone(&Utc);
            if now > prev {
                format_timestamp(now)
            } else {
                format_timestamp(prev + ChronoDuration::microseconds(1))
            }
        }
        Err(_) => format_timestamp(now),
    }
}
