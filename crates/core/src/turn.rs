//! Chat turns as exchanged with the presentation layer

use serde::{Deserialize, Serialize};

use crate::history::{Speaker, Turn};
use crate::record::ExtractedRecord;
use crate::trial::TrialRecord;

/// Successful result of one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    pub extracted_data: ExtractedRecord,
    pub clinical_trials: Vec<TrialRecord>,
    pub health_advice: String,
}

/// Assistant-side content of a rendered turn
pub type AssistantReply = TurnResponse;

/// Body of a chat turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnContent {
    Text(String),
    Reply(Box<AssistantReply>),
}

/// A turn as displayed in the conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Speaker,
    pub content: TurnContent,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Speaker::User,
            content: TurnContent::Text(text.into()),
        }
    }

    pub fn assistant(reply: AssistantReply) -> Self {
        Self {
            role: Speaker::Assistant,
            content: TurnContent::Reply(Box::new(reply)),
        }
    }

    /// Flatten into the history form sent with the next request. An
    /// assistant reply contributes its advice text.
    pub fn to_history_turn(&self) -> Turn {
        let text = match &self.content {
            TurnContent::Text(text) => text.clone(),
            TurnContent::Reply(reply) => reply.health_advice.clone(),
        };
        Turn {
            speaker: self.role,
            text,
        }
    }
}
