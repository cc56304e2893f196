use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use kiosk_display::DisplayModel;
use kiosk_scheduler::SchedulerHandle;
use kiosk_tasks::Kiosk;
use tower_http::cors::CorsLayer;

/// Shared state handed to every handler as `Arc<AppState>`.
pub struct AppState {
    pub display: Arc<DisplayModel>,
    pub kiosk: Arc<Kiosk>,
    pub scheduler: SchedulerHandle,
}

impl AppState {
    pub fn new(display: Arc<DisplayModel>, kiosk: Arc<Kiosk>, scheduler: SchedulerHandle) -> Self {
        Self {
            display,
            kiosk,
            scheduler,
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/display", get(crate::http::display::display_handler))
        .route("/astro", get(crate::http::display::astro_handler))
        .route(
            "/refresh/{category}",
            post(crate::http::display::refresh_handler),
        )
        .with_state(state)
        // the page is served by the backend's own web server
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
