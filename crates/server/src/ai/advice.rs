//! Free-text health advice generation

use std::sync::Arc;

use health_chat_core::{ConversationHistory, ExtractedRecord};
use thiserror::Error;

use super::client::{ModelError, TextModel};
use super::prompt::advice_instruction;

#[derive(Debug, Error)]
pub enum AdviceError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Model returned empty advice")]
    Empty,
}

/// Asks the model for advice about an extracted record.
///
/// The reply is returned as-is (trimmed); its section structure is
/// requested but not verified.
#[derive(Clone)]
pub struct AdviceGenerator {
    model: Arc<dyn TextModel>,
}

impl AdviceGenerator {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    pub async fn generate_advice(
        &self,
        record: &ExtractedRecord,
        history: &ConversationHistory,
    ) -> Result<String, AdviceError> {
        let instruction = advice_instruction(record, history);
        tracing::debug!(follow_up = record.is_follow_up, "Requesting advice");

        let advice = self.model.generate(&instruction).await?;
        let advice = advice.trim();
        if advice.is_empty() {
            return Err(AdviceError::Empty);
        }
        Ok(advice.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::ScriptedModel;

    #[tokio::test]
    async fn returns_trimmed_advice() {
        let model = Arc::new(ScriptedModel::new().advice("\n  Drink water.  \n"));
        let generator = AdviceGenerator::new(model.clone());

        let advice = generator
            .generate_advice(&ExtractedRecord::default(), &ConversationHistory::new())
            .await
            .unwrap();
        assert_eq!(advice, "Drink water.");
        assert!(model.calls()[0].contains("General Advice:"));
    }

    #[tokio::test]
    async fn follow_up_mode_requests_single_answer() {
        let model = Arc::new(ScriptedModel::new().advice("Answer: yes"));
        let generator = AdviceGenerator::new(model.clone());
        let record = ExtractedRecord {
            is_follow_up: true,
            follow_up_topic: Some("rash".into()),
            ..Default::default()
        };

        generator
            .generate_advice(&record, &ConversationHistory::new())
            .await
            .unwrap();
        let sent = &model.calls()[0];
        assert!(sent.contains("Answer:"));
        assert!(!sent.contains("General Advice:"));
    }

    #[tokio::test]
    async fn blank_reply_is_an_error() {
        let generator = AdviceGenerator::new(Arc::new(ScriptedModel::new().advice("   ")));
        let err = generator
            .generate_advice(&ExtractedRecord::default(), &ConversationHistory::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AdviceError::Empty));
    }

    #[tokio::test]
    async fn model_errors_propagate() {
        let generator = AdviceGenerator::new(Arc::new(ScriptedModel::new().failing_advice()));
        let err = generator
            .generate_advice(&ExtractedRecord::default(), &ConversationHistory::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AdviceError::Model(ModelError::Api { status: 529, .. })));
    }
}
