//! Axum router configuration with middleware.
//!
//! Conversation routes hang off the configured base path; the chat route
//! and `/health` are top-level. Unknown paths get a 404 envelope.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use chatgate_core::repository::conversation::ConversationRepository;
use chatgate_infra::config::RouteConfig;

use crate::http::handlers;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router<R: ConversationRepository + 'static>(state: AppState<R>, routes: &RouteConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let base = routes.conversation_base.as_str();

    Router::new()
        // Conversations
        .route(
            &format!("{base}/create"),
            post(handlers::conversation::create_conversation::<R>),
        )
        .route(
            &format!("{base}/list"),
            get(handlers::conversation::list_conversations::<R>),
        )
        .route(
            &format!("{base}/detail"),
            get(handlers::conversation::get_conversation::<R>),
        )
        .route(
            &format!("{base}/delete"),
            delete(handlers::conversation::delete_conversation::<R>),
        )
        // Chat
        .route(&routes.chat_path, post(handlers::chat::chat::<R>))
        .route("/health", get(handlers::health::health_check::<R>))
        .fallback(route_not_found::<R>)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn route_not_found<R: ConversationRepository + 'static>(State(state): State<AppState<R>>) -> ApiResponse {
    state.responder.error(StatusCode::NOT_FOUND, "Route not found")
}
