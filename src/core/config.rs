use std::env;
use std::sync::Arc;

use thiserror::Error;

/// API version pinned for the Azure OpenAI "on your data" extension.
pub const DEFAULT_API_VERSION: &str = "2024-12-01-preview";

pub const SYSTEM_MESSAGE: &str =
    "You are a helpful assistant that helps people find information.";

const REQUIRED_VARS: [&str; 7] = [
    "AZURE_OPENAI_ENDPOINT",
    "AZURE_OPENAI_API_KEY",
    "AZURE_AI_SEARCH_ENDPOINT",
    "AZURE_AI_SEARCH_API_KEY",
    "DEPLOYMENT_NAME",
    "DEPLOYMENT_EMBEDDING_NAME",
    "INDEX_NAME",
];

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing env var(s): {}", .0.join(", "))]
    Missing(Vec<&'static str>),
}

/// How the search index is queried. The completion service only
/// accepts vector search with an embedding deployment in this setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum QueryType {
    #[default]
    Vector,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Vector => "vector",
        }
    }
}

/// Pointers and credentials for the managed search index. The
/// completion service does the retrieval; we only pass these along.
#[derive(Clone, PartialEq)]
pub struct RetrievalConfig {
    pub search_endpoint: String,
    pub index_name: String,
    pub search_api_key: String,
    pub embedding_deployment_name: String,
    pub query_type: QueryType,
}

// Keys are redacted so configs can be logged
impl std::fmt::Debug for RetrievalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalConfig")
            .field("search_endpoint", &self.search_endpoint)
            .field("index_name", &self.index_name)
            .field("search_api_key", &"<redacted>")
            .field("embedding_deployment_name", &self.embedding_deployment_name)
            .field("query_type", &self.query_type)
            .finish()
    }
}

#[derive(Clone, PartialEq)]
pub struct AppConfig {
    pub openai_endpoint: String,
    pub openai_api_key: String,
    pub openai_api_version: String,
    pub deployment_name: String,
    pub system_message: String,
    pub retrieval: Arc<RetrievalConfig>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("openai_endpoint", &self.openai_endpoint)
            .field("openai_api_key", &"<redacted>")
            .field("openai_api_version", &self.openai_api_version)
            .field("deployment_name", &self.deployment_name)
            .field("system_message", &self.system_message)
            .field("retrieval", &self.retrieval)
            .finish()
    }
}

impl AppConfig {
    /// Reads the configuration from the process environment. Every
    /// required variable must be set to a non-blank value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup so tests
    /// don't have to mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&'static str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| value(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        // Presence was checked above
        let required = |key: &str| value(key).unwrap_or_default();

        let retrieval = RetrievalConfig {
            search_endpoint: required("AZURE_AI_SEARCH_ENDPOINT"),
            index_name: required("INDEX_NAME"),
            search_api_key: required("AZURE_AI_SEARCH_API_KEY"),
            embedding_deployment_name: required("DEPLOYMENT_EMBEDDING_NAME"),
            query_type: QueryType::Vector,
        };

        Ok(Self {
            openai_endpoint: required("AZURE_OPENAI_ENDPOINT"),
            openai_api_key: required("AZURE_OPENAI_API_KEY"),
            openai_api_version: value("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            deployment_name: required("DEPLOYMENT_NAME"),
            system_message: SYSTEM_MESSAGE.to_string(),
            retrieval: Arc::new(retrieval),
        })
    }
}
