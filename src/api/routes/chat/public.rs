//! Public types for the chat API
use serde::{Deserialize, Serialize};

use crate::ai::chat::Turn;

#[derive(Deserialize, Serialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ChatResponse {
    pub message: String,
}

impl ChatResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The turns of a session that should be rendered, system message
/// excluded.
#[derive(Serialize, Deserialize, Debug)]
pub struct ChatTranscriptResponse {
    pub session_id: String,
    pub transcript: Vec<Turn>,
}
