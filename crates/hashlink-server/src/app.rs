use axum::extract::DefaultBodyLimit;
use axum::routing::{any, get};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{health_handler, link_handler};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        let body_limit = DefaultBodyLimit::max(state.max_body_bytes());

        Router::new()
            .route("/health", get(health_handler))
            .route("/", any(link_handler))
            .route("/{*key}", any(link_handler))
            .layer(body_limit)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
