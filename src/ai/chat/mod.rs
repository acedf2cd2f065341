mod core;
mod models;

pub use self::core::{ChatBuilder, ChatError, ChatSession};
pub use models::{Conversation, Role, Turn, ValidationError};
