// Route table for the qbank API

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/status", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/api/code-test", code_test_routes())
}

/// Static segments win over `/:language`, so `/validate` and `/languages`
/// are never treated as language names
fn code_test_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/languages", get(handlers::list_languages))
        .route("/validate", post(handlers::validate_code))
        .route("/:language", post(handlers::run_code_test))
}
