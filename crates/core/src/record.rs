use serde::{Deserialize, Serialize};

/// Structured health facts pulled out of one user turn.
///
/// `symptoms` is always present (possibly empty) and `follow_up_topic` is
/// only ever set when `is_follow_up` is true. Use [`ExtractedRecord::normalized`]
/// after building a record from untrusted input to restore both rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedRecord {
    pub age: Option<u32>,
    pub location: Option<String>,
    pub condition: Option<String>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub is_follow_up: bool,
    pub follow_up_topic: Option<String>,
}

impl ExtractedRecord {
    /// Trim every text field, drop blank values and enforce the
    /// follow-up topic rule.
    pub fn normalized(self) -> Self {
        let follow_up_topic = if self.is_follow_up {
            non_blank(self.follow_up_topic)
        } else {
            None
        };

        Self {
            age: self.age,
            location: non_blank(self.location),
            condition: non_blank(self.condition),
            symptoms: self
                .symptoms
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            is_follow_up: self.is_follow_up,
            follow_up_topic,
        }
    }

    /// First whitespace-delimited token of `location`, used as a country
    /// filter. This is a crude approximation, not a geocoder.
    pub fn country(&self) -> Option<&str> {
        self.location
            .as_deref()
            .and_then(|loc| loc.split_whitespace().next())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
