//! Waymark — HTTP API hosting guided tours.

pub mod adapters;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Builds the application router. `main.rs` adds the HTTP layers on top.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/tours", routes::tours::router())
        .with_state(app_state)
}
