//! Per-turn request orchestration.
//!
//! A turn runs extraction first, then the trial search and advice
//! generation concurrently. Only advice failure can fail the turn.

use std::sync::Arc;

use health_chat_core::{ChatError, ConversationHistory, ExtractedRecord, TrialRecord, TurnResponse};
use tracing::Instrument;

use crate::ai::{AdviceGenerator, FieldExtractor, TextModel};
use crate::trials::TrialFinder;

/// Runs chat turns against a model and a trial finder
#[derive(Clone)]
pub struct ChatService {
    extractor: FieldExtractor,
    advisor: AdviceGenerator,
    trials: TrialFinder,
}

impl ChatService {
    pub fn new(model: Arc<dyn TextModel>, trials: TrialFinder) -> Self {
        Self {
            extractor: FieldExtractor::new(model.clone()),
            advisor: AdviceGenerator::new(model),
            trials,
        }
    }

    /// Handle one user turn end to end
    pub async fn handle_turn(
        &self,
        input: &str,
        history: &ConversationHistory,
    ) -> Result<TurnResponse, ChatError> {
        let span = tracing::info_span!("chat_turn", history_len = history.len());
        self.run_turn(input, history).instrument(span).await
    }

    async fn run_turn(
        &self,
        input: &str,
        history: &ConversationHistory,
    ) -> Result<TurnResponse, ChatError> {
        let input = validate_input(input)?;

        tracing::debug!(state = "extracting", "Turn received");
        let record = self.extractor.extract(input, history).await;

        tracing::debug!(
            state = "fetching",
            is_follow_up = record.is_follow_up,
            "Fetching trials and advice"
        );
        let (trials, advice) = tokio::join!(
            self.trials_for(&record),
            self.advisor.generate_advice(&record, history),
        );

        let advice = advice.map_err(|e| {
            tracing::error!(error = %e, "Advice generation failed");
            ChatError::Advice(e.to_string())
        })?;

        tracing::info!(
            trials = trials.len(),
            is_follow_up = record.is_follow_up,
            "Turn complete"
        );

        Ok(TurnResponse {
            extracted_data: record,
            clinical_trials: trials,
            health_advice: advice,
        })
    }

    /// Run extraction alone
    pub async fn extract_only(
        &self,
        input: &str,
        history: &ConversationHistory,
    ) -> Result<ExtractedRecord, ChatError> {
        let input = validate_input(input)?;
        Ok(self.extractor.extract(input, history).await)
    }

    /// Trial search for an already extracted record
    pub async fn trials_for(&self, record: &ExtractedRecord) -> Vec<TrialRecord> {
        self.trials
            .find_trials(
                &record.symptoms,
                record.location.as_deref(),
                record.condition.as_deref(),
            )
            .await
    }
}

fn validate_input(input: &str) -> Result<&str, ChatError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ChatError::InvalidInput("Missing required field: input".into()));
    }
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::ScriptedModel;
    use crate::trials::{RegistryError, TrialQuery, TrialRegistry};
    use async_trait::async_trait;
    use health_chat_core::Turn;
    use serde_json::json;

    struct StaticRegistry(Option<Vec<TrialRecord>>);

    #[async_trait]
    impl TrialRegistry for StaticRegistry {
        async fn search(
            &self,
            _query: &TrialQuery,
            _page_size: usize,
        ) -> Result<Vec<TrialRecord>, RegistryError> {
            self.0.clone().ok_or(RegistryError::Status(500))
        }
    }

    fn service(model: ScriptedModel, trials: Option<Vec<TrialRecord>>) -> ChatService {
        ChatService::new(
            Arc::new(model),
            TrialFinder::new(Arc::new(StaticRegistry(trials))),
        )
    }

    const CONGO_INPUT: &str =
        "I am 43 at Congo. I have diabetes, and my stomach hurts. I am also vomiting blood.";
    const CONGO_EXTRACTION: &str = r#"{"age": 43, "location": "Congo", "condition": "diabetes", "symptoms": ["stomach hurts", "vomiting blood"], "isFollowUp": false, "followUpTopic": null}"#;

    #[tokio::test]
    async fn fresh_issue_turn_returns_full_bundle() {
        let trials = vec![TrialRecord(json!({"title": "Gastric Bleeding in Diabetics"}))];
        let chat = service(
            ScriptedModel::new()
                .extraction(CONGO_EXTRACTION)
                .advice("General Advice: see a doctor today."),
            Some(trials),
        );

        let response = chat
            .handle_turn(CONGO_INPUT, &ConversationHistory::new())
            .await
            .unwrap();

        let record = &response.extracted_data;
        assert_eq!(record.age, Some(43));
        assert!(record.location.as_deref().unwrap().starts_with("Congo"));
        assert_eq!(record.condition.as_deref(), Some("diabetes"));
        assert!(record.symptoms.iter().any(|s| s.contains("stomach hurts")));
        assert!(record.symptoms.iter().any(|s| s.contains("vomiting blood")));
        assert!(!record.is_follow_up);
        assert_eq!(response.clinical_trials.len(), 1);
        assert_eq!(response.health_advice, "General Advice: see a doctor today.");
    }

    #[tokio::test]
    async fn follow_up_turn_uses_answer_mode() {
        let model = Arc::new(
            ScriptedModel::new()
                .extraction(r#"{"symptoms": ["rash"], "isFollowUp": true, "followUpTopic": "the rash"}"#)
                .advice("Answer: keep it dry."),
        );
        let chat = ChatService::new(
            model.clone(),
            TrialFinder::new(Arc::new(StaticRegistry(Some(Vec::new())))),
        );
        let history: ConversationHistory = vec![
            Turn::user("I have an itchy rash on my arm"),
            Turn::assistant("Avoid scratching it."),
        ]
        .into();

        let response = chat.handle_turn("What about that again?", &history).await.unwrap();

        assert!(response.extracted_data.is_follow_up);
        assert_eq!(response.extracted_data.follow_up_topic.as_deref(), Some("the rash"));
        assert_eq!(response.health_advice, "Answer: keep it dry.");
        let advice_call = model.calls().pop().unwrap();
        assert!(advice_call.contains("following up about: the rash"));
        assert!(!advice_call.contains("Symptom Advice:"));
    }

    #[tokio::test]
    async fn trial_failure_does_not_fail_turn() {
        let chat = service(
            ScriptedModel::new()
                .extraction(CONGO_EXTRACTION)
                .advice("General Advice: rest."),
            None,
        );

        let response = chat
            .handle_turn(CONGO_INPUT, &ConversationHistory::new())
            .await
            .unwrap();
        assert!(response.clinical_trials.is_empty());
        assert!(!response.health_advice.is_empty());
    }

    #[tokio::test]
    async fn advice_failure_fails_turn() {
        let chat = service(
            ScriptedModel::new().extraction(CONGO_EXTRACTION).failing_advice(),
            Some(Vec::new()),
        );

        let err = chat
            .handle_turn(CONGO_INPUT, &ConversationHistory::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Advice(_)));
        assert!(!err.to_string().is_empty());
    }

    #[tokio::test]
    async fn blank_input_is_rejected_before_model_calls() {
        let model = Arc::new(ScriptedModel::new());
        let chat = ChatService::new(
            model.clone(),
            TrialFinder::new(Arc::new(StaticRegistry(Some(Vec::new())))),
        );

        let err = chat.handle_turn("   ", &ConversationHistory::new()).await.unwrap_err();
        assert!(err.is_client_error());
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn extract_only_falls_back_on_bad_output() {
        let chat = service(ScriptedModel::new().extraction("not json"), Some(Vec::new()));
        let record = chat
            .extract_only("Symptoms: cough and fever", &ConversationHistory::new())
            .await
            .unwrap();
        assert_eq!(record.symptoms, vec!["cough", "fever"]);
    }
}
