//! health-chat-server library crate
//!
//! Exposes `build_app`, `config` and the service components for
//! integration tests. The actual binary entrypoint is in `main.rs`.

pub mod ai;
pub mod config;
mod error;
mod middleware;
pub mod orchestrator;
mod routes;
pub mod trials;

use std::sync::Arc;

use axum::{Extension, Router, middleware as axum_mw, routing::get};
use health_chat_core::ChatError;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use ai::{ClaudeClient, TextModel};
use config::Config;
use middleware::ApiKeyAuth;
use orchestrator::ChatService;
use trials::{ClinicalTrialsClient, TrialFinder, TrialRegistry};

/// Shared handler state: the injected model and trial finder
#[derive(Clone)]
pub struct AppState {
    model: Option<Arc<dyn TextModel>>,
    trials: TrialFinder,
}

impl AppState {
    pub fn new(model: Option<Arc<dyn TextModel>>, registry: Arc<dyn TrialRegistry>) -> Self {
        Self {
            model,
            trials: TrialFinder::new(registry),
        }
    }

    /// Build the production collaborators from configuration
    pub fn from_config(config: &Config) -> Self {
        // None if ANTHROPIC_API_KEY not set
        let model = config.anthropic_api_key.as_ref().map(|key| {
            let client = ClaudeClient::new(key.clone());
            let client = match &config.anthropic_model {
                Some(model) => client.with_model(model.clone()),
                None => client,
            };
            Arc::new(client) as Arc<dyn TextModel>
        });
        let registry = ClinicalTrialsClient::with_base_url(config.clinical_trials_url.clone());

        Self::new(model, Arc::new(registry))
    }

    pub fn model_configured(&self) -> bool {
        self.model.is_some()
    }

    pub(crate) fn trial_finder(&self) -> &TrialFinder {
        &self.trials
    }

    /// A chat service for one request, if a model is configured
    pub(crate) fn chat_service(&self) -> Result<ChatService, ChatError> {
        let model = self
            .model
            .clone()
            .ok_or_else(|| ChatError::ModelUnavailable("ANTHROPIC_API_KEY not configured".into()))?;
        Ok(ChatService::new(model, self.trials.clone()))
    }
}

/// Build the full application router with all routes and middleware.
///
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a TCP port.
pub fn build_app(state: AppState, config: &Config) -> Router {
    let auth = ApiKeyAuth::new(config.api_key.clone());
    let rate_limiter = middleware::create_rate_limiter(config.rate_limit_rps);

    // Protected routes (require auth)
    let protected_routes = Router::new()
        .nest("/api", routes::api_routes())
        .layer(axum_mw::from_fn(middleware::auth::auth_middleware))
        .layer(Extension(auth))
        .layer(axum_mw::from_fn(middleware::rate_limit_middleware))
        .layer(Extension(rate_limiter));

    // Install Prometheus metrics recorder.
    // Use build_recorder() + set_global_recorder() so that repeated calls
    // (e.g. in integration tests) don't panic; the second install is
    // silently ignored and we still get a valid handle for /metrics.
    let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
    let prometheus_handle = recorder.handle();
    let _ = metrics::set_global_recorder(recorder);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(routes::health::check))
        .route("/metrics", get(routes::metrics::get))
        .layer(Extension(prometheus_handle));

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .layer(axum_mw::from_fn(middleware::audit_middleware))
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn(middleware::metrics_middleware))
}
