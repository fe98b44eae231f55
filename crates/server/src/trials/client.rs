//! ClinicalTrials.gov v2 API client

use async_trait::async_trait;
use health_chat_core::TrialRecord;
use serde::Deserialize;

use super::{RegistryError, TrialQuery, TrialRegistry};

pub const DEFAULT_BASE_URL: &str = "https://clinicaltrials.gov/api/v2";

/// Client for the ClinicalTrials.gov study search
#[derive(Clone)]
pub struct ClinicalTrialsClient {
    http: reqwest::Client,
    base_url: String,
}

/// Response from `GET /studies`
#[derive(Debug, Deserialize)]
struct StudiesResponse {
    #[serde(default)]
    studies: Vec<TrialRecord>,
}

impl ClinicalTrialsClient {
    /// Point the client at another registry deployment
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl TrialRegistry for ClinicalTrialsClient {
    async fn search(
        &self,
        query: &TrialQuery,
        page_size: usize,
    ) -> Result<Vec<TrialRecord>, RegistryError> {
        let page_size = page_size.to_string();
        let response = self
            .http
            .get(format!("{}/studies", self.base_url))
            .query(&[
                ("query.cond", query.condition_terms.as_str()),
                ("query.locn", query.location.as_str()),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await
            .map_err(|e| RegistryError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RegistryError::Status(response.status().as_u16()));
        }

        let body = response
            .json::<StudiesResponse>()
            .await
            .map_err(|e| RegistryError::Decode(e.to_string()))?;

        Ok(body.studies)
    }
}
