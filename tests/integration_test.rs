//! End to end tests against a mocked Azure OpenAI deployment

mod test_utils;

#[cfg(test)]
mod tests {
    use std::sync::{Arc, RwLock};

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use mockito::Matcher;
    use serde_json::json;
    use tower::util::ServiceExt;

    use ragchat::ai::chat::{ChatBuilder, ChatError, Role, Turn};
    use ragchat::api::{AppState, app};
    use ragchat::openai::{AzureChatGateway, GatewayError, SharedGateway};

    use crate::test_utils::{body_to_string, test_config};

    const DEPLOYMENT_PATH: &str = "/openai/deployments/gpt-4o/chat/completions";
    const SYSTEM: &str = "You are a helpful assistant that helps people find information.";

    fn completion_body(content: &str) -> String {
        json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1694268190,
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn it_sends_the_retrieval_block_and_history() {
        let mut server = mockito::Server::new_async().await;
        let config = test_config(&server.url());

        let first = server
            .mock("POST", DEPLOYMENT_PATH)
            .match_query(Matcher::UrlEncoded(
                "api-version".into(),
                "2024-12-01-preview".into(),
            ))
            .match_header("api-key", "test-openai-key")
            .match_body(Matcher::Json(json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": SYSTEM},
                    {"role": "user", "content": "What is the capital of France?"}
                ],
                "data_sources": [{
                    "type": "azure_search",
                    "parameters": {
                        "endpoint": "https://test.search.windows.net",
                        "index_name": "test-index",
                        "authentication": {"type": "api_key", "key": "test-search-key"},
                        "query_type": "vector",
                        "embedding_dependency": {
                            "type": "deployment_name",
                            "deployment_name": "text-embedding-3-small"
                        }
                    }
                }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("Paris."))
            .create_async()
            .await;

        let gateway: SharedGateway = Arc::new(AzureChatGateway::new(&config));
        let mut session = ChatBuilder::new(gateway)
            .system_message(&config.system_message)
            .build();

        let reply = session.next_msg("What is the capital of France?").await;
        first.assert_async().await;
        assert_eq!(reply, Ok("Paris.".to_string()));

        // The follow up carries the whole history
        let second = server
            .mock("POST", DEPLOYMENT_PATH)
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(json!({
                "messages": [
                    {"role": "system", "content": SYSTEM},
                    {"role": "user", "content": "What is the capital of France?"},
                    {"role": "assistant", "content": "Paris."},
                    {"role": "user", "content": "And of Italy?"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("Rome."))
            .create_async()
            .await;

        let reply = session.next_msg("And of Italy?").await;
        second.assert_async().await;
        assert_eq!(reply, Ok("Rome.".to_string()));

        let visible = session.visible_turns();
        assert_eq!(
            visible,
            vec![
                Turn::new(Role::User, "What is the capital of France?"),
                Turn::new(Role::Assistant, "Paris."),
                Turn::new(Role::User, "And of Italy?"),
                Turn::new(Role::Assistant, "Rome."),
            ]
        );
    }

    #[tokio::test]
    async fn it_keeps_history_unchanged_on_auth_failure() {
        let mut server = mockito::Server::new_async().await;
        let config = test_config(&server.url());
        let mock = server
            .mock("POST", DEPLOYMENT_PATH)
            .match_query(Matcher::Any)
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"error":{"code":"401","message":"Access denied due to invalid subscription key."}}"#,
            )
            .create_async()
            .await;

        let gateway: SharedGateway = Arc::new(AzureChatGateway::new(&config));
        let mut session = ChatBuilder::new(gateway).build();

        let err = session.next_msg("Q1").await.unwrap_err();
        mock.assert_async().await;
        assert!(matches!(
            err,
            ChatError::Gateway(GatewayError::Status { status: 401, .. })
        ));
        assert_eq!(session.conversation().len(), 2);
        assert_eq!(
            session.visible_turns(),
            vec![Turn::new(Role::User, "Q1")]
        );
    }

    #[tokio::test]
    async fn it_serves_answers_from_the_deployment() {
        let mut server = mockito::Server::new_async().await;
        let config = test_config(&server.url());
        let mock = server
            .mock("POST", DEPLOYMENT_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("Paris."))
            .create_async()
            .await;

        let gateway: SharedGateway = Arc::new(AzureChatGateway::new(&config));
        let app = app(Arc::new(RwLock::new(AppState::new(config, gateway))));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/chat")
                    .method("POST")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({
                            "session_id": "browser-tab",
                            "message": "What is the capital of France?"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_string(response.into_body()).await;
        assert_eq!(body, r#"{"message":"Paris."}"#);
    }

    #[tokio::test]
    async fn it_surfaces_empty_responses_as_bad_gateway() {
        let mut server = mockito::Server::new_async().await;
        let config = test_config(&server.url());
        let mock = server
            .mock("POST", DEPLOYMENT_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let gateway: SharedGateway = Arc::new(AzureChatGateway::new(&config));
        let app = app(Arc::new(RwLock::new(AppState::new(config, gateway))));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/chat")
                    .method("POST")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({"session_id": "s", "message": "Hi"}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        mock.assert_async().await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_to_string(response.into_body()).await;
        assert!(body.contains("no choices"));
    }
}
