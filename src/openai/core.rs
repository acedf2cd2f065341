use serde::{Deserialize, Serialize};

use crate::ai::chat::Turn;
use crate::core::RetrievalConfig;

use super::gateway::GatewayError;

// Request body for Azure OpenAI chat completions with the "on your
// data" extension. Example:
//
// {
//   "model": "gpt-4o",
//   "messages": [{"role": "system", "content": "..."}, {"role": "user", "content": "..."}],
//   "data_sources": [{
//     "type": "azure_search",
//     "parameters": {
//       "endpoint": "https://example.search.windows.net",
//       "index_name": "docs-index",
//       "authentication": {"type": "api_key", "key": "..."},
//       "query_type": "vector",
//       "embedding_dependency": {"type": "deployment_name", "deployment_name": "text-embedding-3-small"}
//     }
//   }]
// }
#[derive(Serialize, Debug)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Turn],
    pub data_sources: Vec<DataSource<'a>>,
}

#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataSource<'a> {
    AzureSearch { parameters: AzureSearchParameters<'a> },
}

impl<'a> From<&'a RetrievalConfig> for DataSource<'a> {
    fn from(config: &'a RetrievalConfig) -> Self {
        DataSource::AzureSearch {
            parameters: AzureSearchParameters {
                endpoint: &config.search_endpoint,
                index_name: &config.index_name,
                authentication: Authentication::ApiKey {
                    key: &config.search_api_key,
                },
                query_type: config.query_type.as_str(),
                embedding_dependency: EmbeddingDependency::DeploymentName {
                    deployment_name: &config.embedding_deployment_name,
                },
            },
        }
    }
}

#[derive(Serialize, Debug)]
pub struct AzureSearchParameters<'a> {
    pub endpoint: &'a str,
    pub index_name: &'a str,
    pub authentication: Authentication<'a>,
    pub query_type: &'static str,
    pub embedding_dependency: EmbeddingDependency<'a>,
}

#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Authentication<'a> {
    ApiKey { key: &'a str },
}

#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EmbeddingDependency<'a> {
    DeploymentName { deployment_name: &'a str },
}

#[derive(Deserialize, Debug)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Deserialize, Debug)]
pub struct CompletionChoice {
    pub message: CompletionMessage,
}

#[derive(Deserialize, Debug)]
pub struct CompletionMessage {
    pub content: Option<String>,
}

// {"error": {"code": "401", "message": "Access denied due to invalid subscription key."}}
#[derive(Deserialize, Debug)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize, Debug)]
struct ErrorDetail {
    message: String,
}

/// Builds the deployment scoped chat completions URL (without the
/// `api-version` query parameter).
pub fn completion_url(endpoint: &str, deployment_name: &str) -> String {
    format!(
        "{}/openai/deployments/{}/chat/completions",
        endpoint.trim_end_matches('/'),
        deployment_name
    )
}

/// Sends one chat completion request and decodes the response body.
/// Every failure is mapped to a `GatewayError`.
pub async fn completion(
    client: &reqwest::Client,
    url: &str,
    api_version: &str,
    api_key: &str,
    request: &CompletionRequest<'_>,
) -> Result<CompletionResponse, GatewayError> {
    let response = client
        .post(url)
        .query(&[("api-version", api_version)])
        .header("api-key", api_key)
        .json(request)
        .send()
        .await
        .map_err(|e| GatewayError::Transport(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| GatewayError::Transport(e.to_string()))?;

    if !status.is_success() {
        tracing::warn!("Completion service returned {}", status);
        let message = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(err) => err.error.message,
            Err(_) if !body.trim().is_empty() => body.trim().to_string(),
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
        };
        return Err(GatewayError::Status {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str::<CompletionResponse>(&body)
        .map_err(|e| GatewayError::Malformed(e.to_string()))
}
