pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::compiler::handlers as compile_handlers;
use crate::state::AppState;
use crate::templates::handlers as template_handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Compile API
        .route("/api/v1/compile", post(compile_handlers::handle_compile))
        // Templates API
        .route(
            "/api/v1/templates",
            get(template_handlers::handle_list_templates),
        )
        .route(
            "/api/v1/templates/:id",
            get(template_handlers::handle_get_template),
        )
        .with_state(state)
}
