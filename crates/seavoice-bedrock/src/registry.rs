//! Conversation history per (language, persona).
//!
//! The Converse API is stateless, so every request resends the system prompt
//! and the prior turns. The registry is owned by whoever owns the chat
//! surfaces; it is not a process-wide cache.

use std::collections::HashMap;

use seavoice_core::models::language::Language;
use seavoice_core::models::persona::Persona;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::prompts::system_prompt;

/// Role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// System prompt plus the completed exchanges so far.
///
/// History always alternates user, assistant, user, ...
#[derive(Debug, Clone)]
pub struct Conversation {
    language: Language,
    persona: Persona,
    system_prompt: String,
    history: Vec<Turn>,
}

impl Conversation {
    pub fn new(language: Language, persona: Persona) -> Self {
        Self {
            language,
            persona,
            system_prompt: system_prompt(persona, language),
            history: Vec::new(),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Messages to send for a new request: the history followed by it.
    pub fn messages_for(&self, request: &str) -> Vec<Turn> {
        let mut turns = Vec::with_capacity(self.history.len() + 1);
        turns.extend(self.history.iter().cloned());
        turns.push(Turn::user(request));
        turns
    }

    /// Append a completed exchange. Blank replies are not recorded.
    pub fn record(&mut self, request: &str, reply: &str) -> bool {
        if request.trim().is_empty() || reply.trim().is_empty() {
            return false;
        }
        self.history.push(Turn::user(request));
        self.history.push(Turn::assistant(reply));
        true
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

/// Conversations keyed by (language, persona), created on first use.
#[derive(Debug, Default)]
pub struct ConversationRegistry {
    conversations: HashMap<(Language, Persona), Conversation>,
}

impl ConversationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, language: Language, persona: Persona) -> Option<&Conversation> {
        self.conversations.get(&(language, persona))
    }

    pub fn conversation(&mut self, language: Language, persona: Persona) -> &mut Conversation {
        self.conversations
            .entry((language, persona))
            .or_insert_with(|| {
                debug!(%language, %persona, "conversation created");
                Conversation::new(language, persona)
            })
    }

    /// Record a completed exchange. Failed or superseded exchanges are
    /// never passed here.
    pub fn record(&mut self, language: Language, persona: Persona, request: &str, reply: &str) {
        let recorded = self.conversation(language, persona).record(request, reply);
        debug!(%language, %persona, recorded, "exchange recorded");
    }

    /// Forget the history of one conversation.
    pub fn reset(&mut self, language: Language, persona: Persona) {
        if let Some(conversation) = self.conversations.get_mut(&(language, persona)) {
            conversation.reset();
        }
    }

    pub fn clear(&mut self) {
        self.conversations.clear();
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}
