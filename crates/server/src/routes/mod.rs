mod chat;
pub mod health;
pub mod metrics;

use axum::{Router, routing::post};

use crate::AppState;

/// Build chat API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat::chat))
        .route("/extract", post(chat::extract))
        .route("/trials", post(chat::trials))
}
