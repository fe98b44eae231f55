//! Structured field extraction from free-text health descriptions

use std::sync::Arc;

use health_chat_core::{ConversationHistory, ExtractedRecord};
use serde::Deserialize;
use thiserror::Error;

use super::client::TextModel;
use super::fallback::fallback_extract;
use super::prompt::extraction_instruction;

/// Model output that does not match the extraction schema
#[derive(Debug, Error)]
#[error("Malformed extraction output: {0}")]
pub struct ParseError(#[from] serde_json::Error);

/// Wire shape the model is asked to produce. Every field may be null or
/// missing; anything else with the wrong type is rejected.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExtraction {
    age: Option<u32>,
    location: Option<String>,
    condition: Option<String>,
    symptoms: Option<Vec<String>>,
    is_follow_up: Option<bool>,
    follow_up_topic: Option<String>,
}

impl From<RawExtraction> for ExtractedRecord {
    fn from(raw: RawExtraction) -> Self {
        ExtractedRecord {
            age: raw.age,
            location: raw.location,
            condition: raw.condition,
            symptoms: raw.symptoms.unwrap_or_default(),
            is_follow_up: raw.is_follow_up.unwrap_or(false),
            follow_up_topic: raw.follow_up_topic,
        }
        .normalized()
    }
}

/// Pull the body out of the first markdown code fence (with optional
/// language tag), ignoring any prose around it. Text without a fence is
/// returned trimmed.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();

    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after = trimmed[start + 3..].trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let body = match after.find("```") {
        Some(end) => &after[..end],
        None => after,
    };

    body.trim()
}

/// Parse raw model output into a normalised record
pub fn parse_extraction(text: &str) -> Result<ExtractedRecord, ParseError> {
    let raw: RawExtraction = serde_json::from_str(strip_code_fences(text))?;
    Ok(raw.into())
}

/// Turns a user message plus history into an [`ExtractedRecord`].
///
/// Never fails: a model error or unparseable reply falls back to
/// [`fallback_extract`] over the new message.
#[derive(Clone)]
pub struct FieldExtractor {
    model: Arc<dyn TextModel>,
}

impl FieldExtractor {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    pub async fn extract(&self, input: &str, history: &ConversationHistory) -> ExtractedRecord {
        let instruction = extraction_instruction(input, history);

        let raw = match self.model.generate(&instruction).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Extraction call failed, using fallback");
                metrics::counter!("extraction_fallback_total", "reason" => "model_error")
                    .increment(1);
                return fallback_extract(input);
            }
        };

        match parse_extraction(&raw) {
            Ok(record) => {
                tracing::debug!(
                    symptoms = record.symptoms.len(),
                    is_follow_up = record.is_follow_up,
                    "Extracted fields"
                );
                record
            }
            Err(e) => {
                tracing::warn!(error = %e, raw_output = %raw, "Extraction parse failed, using fallback");
                metrics::counter!("extraction_fallback_total", "reason" => "parse_error")
                    .increment(1);
                fallback_extract(input)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::ScriptedModel;
    use health_chat_core::Turn;

    #[test]
    fn strips_fences_with_and_without_language_tag() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  ```\n{}\n```  "), "{}");
        assert_eq!(strip_code_fences("```json {\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn strips_fence_after_prose_lead_in() {
        let reply = "Here is the extracted data:\n```json\n{\"age\": 43, \"symptoms\": [\"cough\"]}\n```\nLet me know if you need more.";
        assert_eq!(
            strip_code_fences(reply),
            "{\"age\": 43, \"symptoms\": [\"cough\"]}"
        );

        let record = parse_extraction(reply).unwrap();
        assert_eq!(record.age, Some(43));
        assert_eq!(record.symptoms, vec!["cough"]);
    }

    #[test]
    fn parses_full_schema() {
        let record = parse_extraction(
            r#"```json
{"age": 43, "location": "Congo", "condition": "diabetes",
 "symptoms": ["stomach hurts", "vomiting blood"], "isFollowUp": false, "followUpTopic": null}
```"#,
        )
        .unwrap();

        assert_eq!(record.age, Some(43));
        assert_eq!(record.location.as_deref(), Some("Congo"));
        assert_eq!(record.condition.as_deref(), Some("diabetes"));
        assert_eq!(record.symptoms, vec!["stomach hurts", "vomiting blood"]);
        assert!(!record.is_follow_up);
    }

    #[test]
    fn null_symptoms_become_empty() {
        let record = parse_extraction(r#"{"age": null, "symptoms": null}"#).unwrap();
        assert!(record.symptoms.is_empty());
        assert!(!record.is_follow_up);
    }

    #[test]
    fn topic_dropped_unless_follow_up() {
        let record =
            parse_extraction(r#"{"isFollowUp": false, "followUpTopic": "diet"}"#).unwrap();
        assert_eq!(record.follow_up_topic, None);

        let record = parse_extraction(r#"{"isFollowUp": true, "followUpTopic": "diet"}"#).unwrap();
        assert_eq!(record.follow_up_topic.as_deref(), Some("diet"));
    }

    #[test]
    fn schema_violations_are_errors() {
        assert!(parse_extraction(r#"{"age": "forty"}"#).is_err());
        assert!(parse_extraction(r#"{"age": -3}"#).is_err());
        assert!(parse_extraction(r#"{"symptoms": "cough"}"#).is_err());
        assert!(parse_extraction(r#"["not", "an", "object"]"#).is_err());
        assert!(parse_extraction("Sure! Here is the data you asked for.").is_err());
    }

    #[tokio::test]
    async fn extract_uses_model_output_when_valid() {
        let model = ScriptedModel::new().extraction(
            r#"{"age": 30, "location": "Lagos", "condition": null, "symptoms": ["cough"], "isFollowUp": false, "followUpTopic": null}"#,
        );
        let extractor = FieldExtractor::new(Arc::new(model));

        let record = extractor
            .extract("I'm 30 in Lagos with a cough", &ConversationHistory::new())
            .await;
        assert_eq!(record.age, Some(30));
        assert_eq!(record.symptoms, vec!["cough"]);
    }

    #[tokio::test]
    async fn extract_falls_back_on_garbage() {
        let model = ScriptedModel::new().extraction("I cannot help with that.");
        let extractor = FieldExtractor::new(Arc::new(model));

        let record = extractor
            .extract("I am 43 at Congo. I have diabetes.", &ConversationHistory::new())
            .await;
        assert_eq!(record.age, Some(43));
        assert_eq!(record.location.as_deref(), Some("Congo"));
        assert_eq!(record.condition.as_deref(), Some("diabetes"));
        assert!(record.symptoms.is_empty());
    }

    #[tokio::test]
    async fn extract_falls_back_on_model_error() {
        let extractor = FieldExtractor::new(Arc::new(ScriptedModel::new().failing_extraction()));
        let history: ConversationHistory = vec![Turn::user("I have a rash")].into();

        let record = extractor.extract("What about that again?", &history).await;
        assert!(record.is_follow_up);
        assert_eq!(record.follow_up_topic, None);
        assert!(record.symptoms.is_empty());
    }
}
