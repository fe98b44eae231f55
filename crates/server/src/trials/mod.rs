//! Clinical-trials lookup for extracted symptoms and conditions

mod client;

pub use client::{ClinicalTrialsClient, DEFAULT_BASE_URL};

use std::sync::Arc;

use async_trait::async_trait;
use health_chat_core::TrialRecord;
use thiserror::Error;

/// Maximum number of studies returned per turn
pub const PAGE_SIZE: usize = 5;

/// Errors from the trials registry
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Registry returned status {0}")]
    Status(u16),

    #[error("Failed to parse registry response: {0}")]
    Decode(String),
}

/// Search parameters sent to the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialQuery {
    /// OR-joined symptom and condition terms
    pub condition_terms: String,
    /// Single location token, treated as a country name
    pub location: String,
}

impl TrialQuery {
    /// Build a query, or `None` when there is no location or nothing to
    /// search for.
    pub fn from_record_fields(
        symptoms: &[String],
        location: Option<&str>,
        condition: Option<&str>,
    ) -> Option<Self> {
        let location = location?.split_whitespace().next()?.to_string();

        let terms: Vec<&str> = symptoms
            .iter()
            .map(String::as_str)
            .chain(condition)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        if terms.is_empty() {
            return None;
        }

        Some(Self {
            condition_terms: terms.join(" OR "),
            location,
        })
    }
}

/// A searchable clinical-trials registry
#[async_trait]
pub trait TrialRegistry: Send + Sync {
    async fn search(
        &self,
        query: &TrialQuery,
        page_size: usize,
    ) -> Result<Vec<TrialRecord>, RegistryError>;
}

/// Finds trials for a turn, absorbing every registry failure.
#[derive(Clone)]
pub struct TrialFinder {
    registry: Arc<dyn TrialRegistry>,
}

impl TrialFinder {
    pub fn new(registry: Arc<dyn TrialRegistry>) -> Self {
        Self { registry }
    }

    /// Returns at most [`PAGE_SIZE`] studies; empty when inputs are missing
    /// or the registry fails.
    pub async fn find_trials(
        &self,
        symptoms: &[String],
        location: Option<&str>,
        condition: Option<&str>,
    ) -> Vec<TrialRecord> {
        let Some(query) = TrialQuery::from_record_fields(symptoms, location, condition) else {
            tracing::debug!("No location or search terms, skipping trial search");
            return Vec::new();
        };

        match self.registry.search(&query, PAGE_SIZE).await {
            Ok(mut trials) => {
                trials.truncate(PAGE_SIZE);
                tracing::debug!(
                    count = trials.len(),
                    location = %query.location,
                    "Trial search complete"
                );
                trials
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    terms = %query.condition_terms,
                    location = %query.location,
                    "Trial search failed, returning no trials"
                );
                metrics::counter!("trial_search_failures_total").increment(1);
                Vec::new()
            }
        }
    }
}
