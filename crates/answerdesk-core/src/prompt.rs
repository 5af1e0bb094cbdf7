// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed prompt material shared by every provider integration.

/// Tone and behaviour guidance prepended to every tenant persona.
pub const BASE_SYSTEM_INSTRUCTION: &str = "You are a friendly, professional customer support assistant. \
Answer clearly and concisely in a warm, conversational tone. \
If you do not know the answer, say so honestly instead of guessing, \
and never invent prices, policies, or contact details.";

/// Default number of trailing turns forwarded to a provider.
pub const DEFAULT_HISTORY_WINDOW: usize = 6;

/// Combines the base instruction with the tenant persona.
pub fn compose_system_prompt(persona: &str) -> String {
    let persona = persona.trim();
    if persona.is_empty() {
        BASE_SYSTEM_INSTRUCTION.to_string()
    } else {
        format!("{BASE_SYSTEM_INSTRUCTION}\n\n{persona}")
    }
}
