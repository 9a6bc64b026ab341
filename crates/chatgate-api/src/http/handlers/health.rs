//! Liveness endpoint.

use axum::extract::State;

use chatgate_core::repository::conversation::ConversationRepository;

use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /health - Report version, database availability and providers.
pub async fn health_check<R: ConversationRepository + 'static>(State(state): State<AppState<R>>) -> ApiResponse {
    let registry = state.dispatcher.registry();
    state.responder.success(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "database": state.database_configured(),
        "providers": registry.list_names(),
        "defaultProvider": registry.default_provider(),
    }))
}
