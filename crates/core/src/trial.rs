use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A study returned by the clinical-trials registry.
///
/// Passed through to the client untouched; only the title is read here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrialRecord(pub JsonValue);

impl TrialRecord {
    /// Human-readable study title, if the registry supplied one
    pub fn title(&self) -> Option<&str> {
        let identification = self
            .0
            .get("protocolSection")
            .and_then(|p| p.get("identificationModule"));

        identification
            .and_then(|m| m.get("briefTitle"))
            .or_else(|| identification.and_then(|m| m.get("officialTitle")))
            .or_else(|| self.0.get("title"))
            .and_then(|v| v.as_str())
    }
}

impl From<JsonValue> for TrialRecord {
    fn from(value: JsonValue) -> Self {
        Self(value)
    }
}
