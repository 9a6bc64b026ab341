//! Chat dispatch handler.
//!
//! POST {chat_path} - Validate the request, pick a provider and model, and
//! return the assistant reply. Nothing is persisted.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde_json::json;

use chatgate_core::dispatch::DispatchInput;
use chatgate_core::repository::conversation::ConversationRepository;

use crate::http::error::{AppError, INVALID_JSON_BODY};
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// POST {chat_path} - Send a conversation to a chat provider.
pub async fn chat<R: ConversationRepository + 'static>(
    State(state): State<AppState<R>>,
    body: Result<Json<DispatchInput>, JsonRejection>,
) -> ApiResponse {
    let result = send(&state, body).await;
    state.responder.respond(result)
}

async fn send<R: ConversationRepository>(
    state: &AppState<R>,
    body: Result<Json<DispatchInput>, JsonRejection>,
) -> Result<ApiResponse, AppError> {
    let Json(input) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected chat body");
        AppError::Validation(INVALID_JSON_BODY.to_string())
    })?;

    let reply = state.dispatcher.dispatch(&input).await?;

    Ok(state.responder.success(json!({
        "role": reply.role,
        "message": reply.content,
    })))
}
