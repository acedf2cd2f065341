//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use axum::{Router, body::Body};

use ragchat::ai::chat::Conversation;
use ragchat::api::AppState;
use ragchat::api::app;
use ragchat::core::{AppConfig, QueryType, RetrievalConfig};
use ragchat::openai::{CompletionGateway, GatewayError, SharedGateway};

pub fn test_config(openai_endpoint: &str) -> AppConfig {
    AppConfig {
        openai_endpoint: openai_endpoint.to_string(),
        openai_api_key: String::from("test-openai-key"),
        openai_api_version: String::from("2024-12-01-preview"),
        deployment_name: String::from("gpt-4o"),
        system_message: String::from(
            "You are a helpful assistant that helps people find information.",
        ),
        retrieval: Arc::new(RetrievalConfig {
            search_endpoint: String::from("https://test.search.windows.net"),
            index_name: String::from("test-index"),
            search_api_key: String::from("test-search-key"),
            embedding_deployment_name: String::from("text-embedding-3-small"),
            query_type: QueryType::Vector,
        }),
    }
}

/// Creates a test application router backed by `gateway` instead of
/// the real completion service.
pub fn test_app(gateway: SharedGateway) -> Router {
    let app_state = AppState::new(test_config("http://localhost:0"), gateway);
    app(Arc::new(RwLock::new(app_state)))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not utf-8")
}

/// Answers every question with "Re: <question>" unless the question
/// is "fail", which yields a transport error. Tracks how many calls
/// were in flight at once.
#[derive(Default)]
pub struct EchoGateway {
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub seen: Mutex<Vec<Conversation>>,
}

impl EchoGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Self::default()
        })
    }
}

#[async_trait]
impl CompletionGateway for EchoGateway {
    async fn complete(&self, conversation: &Conversation) -> Result<String, GatewayError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.seen.lock().unwrap().push(conversation.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let question = conversation
            .last()
            .map(|t| t.content().to_string())
            .unwrap_or_default();
        if question == "fail" {
            return Err(GatewayError::Transport(String::from("connection refused")));
        }
        Ok(format!("Re: {}", question))
    }
}
