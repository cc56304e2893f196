use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use kiosk_core::{Category, KioskError, UnitSystem};
use kiosk_display::model::DisplaySnapshot;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::app::AppState;

/// GET /display: every element's current state.
pub async fn display_handler(State(state): State<Arc<AppState>>) -> Json<DisplaySnapshot> {
    Json(state.display.snapshot())
}

/// GET /astro: astro and moon store snapshots.
pub async fn astro_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "anchor": state.kiosk.anchor().to_string(),
        "astro": state.kiosk.astro_store().snapshot(),
        "moon": state.kiosk.moon_store().snapshot(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct RefreshParams {
    pub units: Option<String>,
}

/// POST /refresh/{category}?units=: dispatch a refresh now, in the background.
pub async fn refresh_handler(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(params): Query<RefreshParams>,
) -> (StatusCode, Json<Value>) {
    let parsed = category.parse::<Category>().and_then(|category| {
        params
            .units
            .as_deref()
            .map(str::parse::<UnitSystem>)
            .transpose()
            .map(|units| (category, units))
    });
    let (category, units) = match parsed {
        Ok(ok) => ok,
        Err(e) => return bad_request(e),
    };

    info!(%category, ?units, "manual refresh requested");
    let dispatcher = Arc::clone(state.kiosk.dispatcher());
    tokio::spawn(async move { dispatcher.dispatch(category, units).await });

    (
        StatusCode::ACCEPTED,
        Json(json!({
            "category": category.as_str(),
            "units": units.map(|u| u.as_str()),
        })),
    )
}

fn bad_request(e: KioskError) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "code": e.code(), "error": e.to_string() })),
    )
}
