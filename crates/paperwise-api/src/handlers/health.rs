use axum::{extract::State, response::IntoResponse, Json};

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.orchestrator.cache_stats();
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "cache": {
            "hits": stats.hits,
            "misses": stats.misses,
            "errors": stats.errors,
        },
    }))
}
