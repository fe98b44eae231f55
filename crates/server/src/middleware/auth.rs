//! API key authentication for the chat API

use axum::{
    Json,
    body::Body,
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use health_chat_core::ErrorBody;

/// Header carrying the shared API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// API Key authentication state
#[derive(Clone)]
pub struct ApiKeyAuth {
    api_key: Option<String>,
}

impl ApiKeyAuth {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }

    /// True when no key is configured or the request presents the right one
    fn allows(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = &self.api_key else {
            return true;
        };
        headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|presented| presented == expected)
    }
}

/// Reject requests without a valid `X-API-Key` when a key is configured
pub async fn auth_middleware(request: Request<Body>, next: Next) -> Response {
    let allowed = request
        .extensions()
        .get::<ApiKeyAuth>()
        .is_none_or(|auth| auth.allows(request.headers()));

    if !allowed {
        tracing::warn!(path = %request.uri().path(), "Rejected request with invalid API key");
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody::new("Invalid or missing API key")),
        )
            .into_response();
    }

    next.run(request).await
}
