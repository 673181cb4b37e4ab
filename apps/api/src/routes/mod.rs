pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;
use crate::thesis::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        // Page catalog
        .route("/api/v1/pages", get(handlers::handle_list_pages))
        .route("/api/v1/pages/:slug", get(handlers::handle_get_page))
        .route(
            "/api/v1/pages/:slug/normalize",
            post(handlers::handle_normalize),
        )
        // Generation cycle (session required)
        .route(
            "/api/v1/pages/:slug/generate",
            post(handlers::handle_generate),
        )
        .route(
            "/api/v1/pages/:slug/state",
            get(handlers::handle_get_state).delete(handlers::handle_reset),
        )
        .route("/api/v1/pages/:slug/topic", put(handlers::handle_edit_topic))
        .with_state(state)
}
