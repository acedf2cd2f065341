use thiserror::Error;

use super::models::{Conversation, Turn, ValidationError};
use crate::core::config::SYSTEM_MESSAGE;
use crate::openai::{GatewayError, SharedGateway};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// One chat session: an isolated conversation plus the gateway used
/// to answer it.
///
/// `next_msg` takes `&mut self` so a session can only have one
/// request in flight. Sessions share the gateway but never the
/// conversation.
///
/// Use `ChatBuilder` to construct a `ChatSession`.
pub struct ChatSession {
    gateway: SharedGateway,
    conversation: Conversation,
}

impl ChatSession {
    /// Runs the next turn in chat: records the user's message, asks
    /// the gateway for a reply and records it.
    ///
    /// Empty input is rejected without touching the history. When the
    /// gateway fails the user's message stays in the history without
    /// an answer and is sent again as context with the next message.
    pub async fn next_msg(&mut self, text: &str) -> Result<String, ChatError> {
        self.conversation.append_user(text)?;

        match self.gateway.complete(&self.conversation).await {
            Ok(reply) => {
                self.conversation.append_assistant(&reply);
                tracing::debug!("Conversation now has {} turns", self.conversation.len());
                Ok(reply)
            }
            Err(e) => {
                tracing::debug!("Completion failed, leaving history unchanged: {}", e);
                Err(e.into())
            }
        }
    }

    /// Start over with only the system message.
    pub fn reset(&mut self) {
        self.conversation.reset();
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn visible_turns(&self) -> Vec<Turn> {
        self.conversation.visible_turns().cloned().collect()
    }
}

pub struct ChatBuilder {
    gateway: SharedGateway,
    system_message: String,
}

impl ChatBuilder {
    pub fn new(gateway: SharedGateway) -> Self {
        Self {
            gateway,
            system_message: SYSTEM_MESSAGE.to_string(),
        }
    }

    pub fn system_message(mut self, system_message: &str) -> Self {
        self.system_message = system_message.to_string();
        self
    }

    pub fn build(self) -> ChatSession {
        ChatSession {
            gateway: self.gateway,
            conversation: Conversation::with_system_message(&self.system_message),
        }
    }
}
