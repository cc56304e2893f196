use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppState;

/// GET /health: liveness probe plus store readiness.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "anchor": state.kiosk.anchor().to_string(),
        "astro_complete": state.kiosk.astro_store().is_complete(),
        "moon_complete": state.kiosk.moon_store().is_complete(),
        "repeaters": state.scheduler.list_tasks(),
    }))
}
