//! The core models for managing a stateful chat with an LLM.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::SYSTEM_MESSAGE;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

/// A single message in the conversation. Fields are private so a turn
/// can't be changed after it's appended.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    pub fn new(role: Role, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Message is empty")]
    EmptyInput,
}

/// Append-only chat history for a single session. The first turn is
/// always the system message and is never removed.
#[derive(Clone, Debug, PartialEq)]
pub struct Conversation(Vec<Turn>);

impl Default for Conversation {
    fn default() -> Self {
        Self::initialize()
    }
}

impl Conversation {
    pub fn initialize() -> Self {
        Self::with_system_message(SYSTEM_MESSAGE)
    }

    pub fn with_system_message(system_message: &str) -> Self {
        Self(vec![Turn::new(Role::System, system_message)])
    }

    /// Drops all history and reseeds with the same system message.
    pub fn reset(&mut self) {
        self.0.truncate(1);
    }

    pub fn append_user(&mut self, text: &str) -> Result<(), ValidationError> {
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyInput);
        }
        self.0.push(Turn::new(Role::User, text));
        Ok(())
    }

    pub fn append_assistant(&mut self, text: &str) {
        self.0.push(Turn::new(Role::Assistant, text))
    }

    /// Turns that should be shown to a person, i.e. everything except
    /// the system message.
    pub fn visible_turns(&self) -> impl Iterator<Item = &Turn> + '_ {
        self.0.iter().filter(|t| t.role != Role::System)
    }

    pub fn turns(&self) -> &[Turn] {
        &self.0
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.0.last()
    }

    pub fn has_unanswered_user_turn(&self) -> bool {
        self.last().is_some_and(|t| t.role == Role::User)
    }
}
