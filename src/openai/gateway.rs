use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::ai::chat::{Conversation, Role};
use crate::core::{AppConfig, RetrievalConfig};

use super::core::{CompletionRequest, DataSource, completion, completion_url};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Request to the completion service failed: {0}")]
    Transport(String),

    #[error("Completion service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed completion response: {0}")]
    Malformed(String),

    #[error("Completion response contained no choices")]
    EmptyChoices,

    #[error("Completion response contained no message content")]
    EmptyContent,

    #[error("Conversation can't be completed: {0}")]
    InvalidConversation(String),
}

/// Turns a conversation into the assistant's next reply.
///
/// Implementors own transport and serialization details so the chat
/// session only ever sees plain text or a `GatewayError`.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, conversation: &Conversation) -> Result<String, GatewayError>;
}

pub type SharedGateway = Arc<dyn CompletionGateway>;

/// Calls an Azure OpenAI chat deployment with an Azure AI Search data
/// source attached, so retrieval happens on the service side.
pub struct AzureChatGateway {
    client: reqwest::Client,
    url: String,
    api_key: String,
    api_version: String,
    deployment_name: String,
    retrieval: Arc<RetrievalConfig>,
}

impl AzureChatGateway {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: completion_url(&config.openai_endpoint, &config.deployment_name),
            api_key: config.openai_api_key.clone(),
            api_version: config.openai_api_version.clone(),
            deployment_name: config.deployment_name.clone(),
            retrieval: Arc::clone(&config.retrieval),
        }
    }

    /// Composes the request body for `conversation`. Nothing is
    /// reformatted: messages are the conversation's turns as-is.
    pub fn request<'a>(&'a self, conversation: &'a Conversation) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.deployment_name,
            messages: conversation.turns(),
            data_sources: vec![DataSource::from(self.retrieval.as_ref())],
        }
    }
}

fn check_conversation(conversation: &Conversation) -> Result<(), GatewayError> {
    match conversation.turns().first() {
        Some(turn) if turn.role() == Role::System => {}
        _ => {
            return Err(GatewayError::InvalidConversation(
                "missing system message".to_string(),
            ));
        }
    }
    if !conversation.has_unanswered_user_turn() {
        return Err(GatewayError::InvalidConversation(
            "last message must be from the user".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl CompletionGateway for AzureChatGateway {
    async fn complete(&self, conversation: &Conversation) -> Result<String, GatewayError> {
        check_conversation(conversation)?;

        let request = self.request(conversation);
        tracing::debug!(
            "Requesting completion from {} with {} messages using index {}",
            self.deployment_name,
            request.messages.len(),
            self.retrieval.index_name
        );

        let response = completion(
            &self.client,
            &self.url,
            &self.api_version,
            &self.api_key,
            &request,
        )
        .await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(GatewayError::EmptyChoices)?;

        match choice.message.content {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(GatewayError::EmptyContent),
        }
    }
}
