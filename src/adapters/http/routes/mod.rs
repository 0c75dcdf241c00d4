pub mod mini_program;

use axum::{Router, routing::get};

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/mini-program", mini_program::router())
}

async fn health() -> &'static str {
    "ok"
}
