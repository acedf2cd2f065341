use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::ai::chat::{ChatBuilder, ChatSession};
use crate::core::AppConfig;
use crate::openai::SharedGateway;

/// A session is locked for the whole request/response cycle so that
/// two submissions to the same session can't interleave.
pub type SessionHandle = Arc<Mutex<ChatSession>>;

pub struct AppState {
    pub config: AppConfig,
    pub gateway: SharedGateway,
    // Each client gets its own conversation keyed by session ID
    sessions: HashMap<String, SessionHandle>,
}

impl AppState {
    pub fn new(config: AppConfig, gateway: SharedGateway) -> Self {
        Self {
            config,
            gateway,
            sessions: HashMap::new(),
        }
    }

    pub fn session(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.get(id).cloned()
    }

    pub fn get_or_create_session(&mut self, id: &str) -> SessionHandle {
        let AppState {
            config,
            gateway,
            sessions,
        } = self;
        let session = sessions.entry(id.to_string()).or_insert_with(|| {
            tracing::debug!("Starting chat session {}", id);
            let chat = ChatBuilder::new(Arc::clone(gateway))
                .system_message(&config.system_message)
                .build();
            Arc::new(Mutex::new(chat))
        });
        Arc::clone(session)
    }

    /// Drops the session so its history can be freed. Returns whether
    /// a session with that ID existed.
    pub fn remove_session(&mut self, id: &str) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            tracing::debug!("Ended chat session {}", id);
        }
        removed
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
