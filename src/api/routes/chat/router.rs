//! Router for the chat API

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use super::public;
use crate::ai::chat::{ChatError, ValidationError};
use crate::api::public::ApiError;
use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

fn session_not_found(id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        axum::Json(json!({"error": format!("Chat session {} not found", id)})),
    )
        .into_response()
}

/// Get the visible transcript of a chat session by ID
async fn chat_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .read()
        .expect("Unable to read share state")
        .session(&id);

    let Some(session) = session else {
        return Ok(session_not_found(&id));
    };

    let transcript = session.lock().await.visible_turns();
    Ok(axum::Json(public::ChatTranscriptResponse {
        session_id: id,
        transcript,
    })
    .into_response())
}

/// Initiate or add to a chat session and respond with the assistant's
/// reply
async fn chat_handler(
    State(state): State<SharedState>,
    axum::Json(payload): axum::Json<public::ChatRequest>,
) -> Result<axum::Json<public::ChatResponse>, ApiError> {
    // Blank input never creates a session
    if payload.message.trim().is_empty() {
        return Err(ChatError::from(ValidationError::EmptyInput).into());
    }

    let session = state
        .write()
        .expect("Unable to write share state")
        .get_or_create_session(&payload.session_id);

    // Held across the completion call so requests to the same session
    // are answered one at a time
    let mut session = session.lock().await;
    let reply = session.next_msg(&payload.message).await?;

    Ok(axum::Json(public::ChatResponse::new(&reply)))
}

/// Start a session over with only the system message
async fn reset_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .read()
        .expect("Unable to read share state")
        .session(&id);

    let Some(session) = session else {
        return Ok(session_not_found(&id));
    };

    let mut session = session.lock().await;
    session.reset();

    Ok(axum::Json(public::ChatTranscriptResponse {
        session_id: id,
        transcript: session.visible_turns(),
    })
    .into_response())
}

/// End a chat session and forget its history
async fn delete_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = state
        .write()
        .expect("Unable to write share state")
        .remove_session(&id);

    if !removed {
        return Ok(session_not_found(&id));
    }
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(chat_handler))
        .route("/{id}", get(chat_session).delete(delete_handler))
        .route("/{id}/reset", post(reset_handler))
}
