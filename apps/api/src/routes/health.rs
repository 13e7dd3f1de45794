use axum::{extract::State, Json};

use crate::models::review::ServiceInfo;
use crate::state::AppState;

/// GET /
/// Reports which backend and model this process is wired to.
pub async fn health_handler(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        ok: true,
        provider: state.provider.kind().to_string(),
        model: state.provider.model().to_string(),
    })
}
