pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::review::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(health::health_handler))
        .route("/api/review", post(handlers::handle_review))
        .route("/api/refine", post(handlers::handle_refine))
        .route("/api/parse_resume", post(handlers::handle_parse_resume))
        .route("/api/review_file", post(handlers::handle_review_file))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
