pub mod health;

use axum::{routing::get, routing::post, Router};

use crate::interpret::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/chart", post(handlers::handle_chart))
        .route("/api/v1/interpret", post(handlers::handle_interpret))
        .with_state(state)
}
