//! Server configuration

use crate::trials::DEFAULT_BASE_URL;

const DEFAULT_RATE_LIMIT_RPS: u32 = 100;

/// Server configuration loaded from environment variables
pub struct Config {
    pub bind_address: String,
    /// Shared key required on `/api/*` routes; auth is off when unset
    pub api_key: Option<String>,
    pub cors_origins: Vec<String>,
    pub rate_limit_rps: u32,
    /// Credential for the generative model; model-backed routes fail without it
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: Option<String>,
    pub clinical_trials_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            api_key: non_empty_var("API_KEY"),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or_else(|_| vec!["*".to_string()]),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|rps| *rps > 0)
                .unwrap_or(DEFAULT_RATE_LIMIT_RPS),
            anthropic_api_key: non_empty_var("ANTHROPIC_API_KEY"),
            anthropic_model: non_empty_var("ANTHROPIC_MODEL"),
            clinical_trials_url: std::env::var("CLINICAL_TRIALS_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
