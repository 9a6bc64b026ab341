//! Conversation HTTP handlers.
//!
//! Endpoints (relative to the configured base path):
//! - POST   {base}/create                  - Create a conversation
//! - GET    {base}/list?userId=            - List a user's conversations
//! - GET    {base}/detail?conversationId=  - Get a single conversation
//! - DELETE {base}/delete?conversationId=  - Delete a conversation
//!
//! Input is validated before the database is consulted, so malformed
//! requests get a 400 even when the database is not configured.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::json;

use chatgate_core::conversation::input::CreateConversationInput;
use chatgate_core::repository::conversation::ConversationRepository;
use chatgate_core::validation;

use crate::http::error::{AppError, INVALID_JSON_BODY};
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Query parameters for `list`.
#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Query parameters for `detail` and `delete`.
#[derive(Debug, Default, Deserialize)]
pub struct ConversationQuery {
    #[serde(rename = "conversationId")]
    pub conversation_id: Option<String>,
}

fn query_rejected(rejection: QueryRejection) -> AppError {
    tracing::debug!(error = %rejection, "Rejected query string");
    AppError::Validation("Invalid query string".to_string())
}

/// POST {base}/create - Create a conversation.
pub async fn create_conversation<R: ConversationRepository + 'static>(
    State(state): State<AppState<R>>,
    body: Result<Json<CreateConversationInput>, JsonRejection>,
) -> ApiResponse {
    let result = create(&state, body).await;
    state.responder.respond(result)
}

async fn create<R: ConversationRepository>(
    state: &AppState<R>,
    body: Result<Json<CreateConversationInput>, JsonRejection>,
) -> Result<ApiResponse, AppError> {
    let Json(input) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected create body");
        AppError::Validation(INVALID_JSON_BODY.to_string())
    })?;
    let new_conversation = input.validate()?;
    let service = state.conversations()?;

    let conversation = service
        .create(new_conversation)
        .await
        .map_err(|e| AppError::from_conversation(e, "Failed to create conversation"))?;

    Ok(state
        .responder
        .success_with(StatusCode::CREATED, "", json!({ "conversation": conversation })))
}

/// GET {base}/list?userId= - List a user's conversations, newest first.
pub async fn list_conversations<R: ConversationRepository + 'static>(
    State(state): State<AppState<R>>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> ApiResponse {
    let result = list(&state, query).await;
    state.responder.respond(result)
}

async fn list<R: ConversationRepository>(
    state: &AppState<R>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<ApiResponse, AppError> {
    let Query(query) = query.map_err(query_rejected)?;
    let user_id = validation::positive_id_param("userId", query.user_id.as_deref())?;
    let service = state.conversations()?;

    let conversations = service
        .list(user_id)
        .await
        .map_err(|e| AppError::from_conversation(e, "Failed to list conversations"))?;

    Ok(state.responder.success(json!({ "conversations": conversations })))
}

/// GET {base}/detail?conversationId= - Get a single conversation.
pub async fn get_conversation<R: ConversationRepository + 'static>(
    State(state): State<AppState<R>>,
    query: Result<Query<ConversationQuery>, QueryRejection>,
) -> ApiResponse {
    let result = detail(&state, query).await;
    state.responder.respond(result)
}

async fn detail<R: ConversationRepository>(
    state: &AppState<R>,
    query: Result<Query<ConversationQuery>, QueryRejection>,
) -> Result<ApiResponse, AppError> {
    let Query(query) = query.map_err(query_rejected)?;
    let id = validation::positive_id_param("conversationId", query.conversation_id.as_deref())?;
    let service = state.conversations()?;

    let conversation = service
        .get(id)
        .await
        .map_err(|e| AppError::from_conversation(e, "Failed to load conversation"))?;

    Ok(state.responder.success(json!({ "conversation": conversation })))
}

/// DELETE {base}/delete?conversationId= - Delete a conversation.
pub async fn delete_conversation<R: ConversationRepository + 'static>(
    State(state): State<AppState<R>>,
    query: Result<Query<ConversationQuery>, QueryRejection>,
) -> ApiResponse {
    let result = delete(&state, query).await;
    state.responder.respond(result)
}

async fn delete<R: ConversationRepository>(
    state: &AppState<R>,
    query: Result<Query<ConversationQuery>, QueryRejection>,
) -> Result<ApiResponse, AppError> {
    let Query(query) = query.map_err(query_rejected)?;
    let id = validation::positive_id_param("conversationId", query.conversation_id.as_deref())?;
    let service = state.conversations()?;

    let deleted = service
        .delete(id)
        .await
        .map_err(|e| AppError::from_conversation(e, "Failed to delete conversation"))?;

    Ok(state.responder.success(deleted))
}
