mod core;
pub mod gateway;

pub use self::core::{
    Authentication, AzureSearchParameters, CompletionRequest, CompletionResponse, DataSource,
    EmbeddingDependency, completion, completion_url,
};
pub use gateway::{AzureChatGateway, CompletionGateway, GatewayError, SharedGateway};
