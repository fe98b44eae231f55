//! Chat turn endpoints (/api/chat, /api/extract, /api/trials)

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use health_chat_core::{ConversationHistory, ExtractedRecord, TrialRecord, TurnResponse};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::AppError;

/// Request body for a chat turn
#[derive(Deserialize)]
pub struct ChatRequest {
    input: Option<String>,
    #[serde(default)]
    history: ConversationHistory,
}

impl ChatRequest {
    fn input(&self) -> Result<&str, AppError> {
        self.input
            .as_deref()
            .filter(|i| !i.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("Missing required field: input".to_string()))
    }
}

/// Response body for extraction only
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    extracted_data: ExtractedRecord,
}

/// Request body for a direct trial search
#[derive(Deserialize)]
pub struct TrialsRequest {
    #[serde(default)]
    symptoms: Vec<String>,
    location: Option<String>,
    condition: Option<String>,
}

/// Response body for a direct trial search
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialsResponse {
    clinical_trials: Vec<TrialRecord>,
}

/// POST /api/chat - Run one chat turn
///
/// Extracts structured fields from the message, then searches for trials
/// and generates advice concurrently. A failed trial search yields an
/// empty list; a failed advice call fails the turn.
pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<TurnResponse>, AppError> {
    let Json(body) = body?;
    let input = body.input()?;
    let service = state.chat_service()?;

    tracing::info!(history_len = body.history.len(), "Chat request");

    let response = service.handle_turn(input, &body.history).await?;
    Ok(Json(response))
}

/// POST /api/extract - Structured extraction without trials or advice
pub async fn extract(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ExtractResponse>, AppError> {
    let Json(body) = body?;
    let input = body.input()?;
    let service = state.chat_service()?;

    let extracted_data = service.extract_only(input, &body.history).await?;
    Ok(Json(ExtractResponse { extracted_data }))
}

/// POST /api/trials - Trial search for already extracted fields
pub async fn trials(
    State(state): State<AppState>,
    body: Result<Json<TrialsRequest>, JsonRejection>,
) -> Result<Json<TrialsResponse>, AppError> {
    let Json(body) = body?;

    let clinical_trials = state
        .trial_finder()
        .find_trials(
            &body.symptoms,
            body.location.as_deref(),
            body.condition.as_deref(),
        )
        .await;
    Ok(Json(TrialsResponse { clinical_trials }))
}
