//! health-chat-core: Shared types for the health chat service
//!
//! This crate provides the transport-free domain model used across the
//! server: the extracted record, conversation history, trial records,
//! chat turns and the error taxonomy of a turn.

pub mod error;
pub mod history;
pub mod record;
pub mod trial;
pub mod turn;

pub use error::{ChatError, ErrorBody};
pub use history::{ConversationHistory, Speaker, Turn};
pub use record::ExtractedRecord;
pub use trial::TrialRecord;
pub use turn::{AssistantReply, ChatTurn, TurnContent, TurnResponse};
