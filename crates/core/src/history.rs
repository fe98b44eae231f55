//! Conversation history supplied by the client on every request

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::User => f.write_str("User"),
            Speaker::Assistant => f.write_str("Assistant"),
        }
    }
}

/// One prior message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TurnRepr")]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }

    /// Parse a turn rendered as a plain string. A leading `User:` or
    /// `Assistant:` label selects the speaker; unlabelled text is a user turn.
    pub fn from_plain(line: &str) -> Self {
        let trimmed = line.trim();
        for (label, speaker) in [("assistant:", Speaker::Assistant), ("user:", Speaker::User)] {
            let matches = trimmed
                .get(..label.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(label));
            if matches {
                return Self {
                    speaker,
                    text: trimmed[label.len()..].trim().to_string(),
                };
            }
        }
        Self::user(trimmed)
    }
}

/// Wire form of a turn: either `"text"` or `{"speaker": .., "text": ..}`
#[derive(Deserialize)]
#[serde(untagged)]
enum TurnRepr {
    Plain(String),
    Structured { speaker: Speaker, text: String },
}

impl From<TurnRepr> for Turn {
    fn from(repr: TurnRepr) -> Self {
        match repr {
            TurnRepr::Plain(line) => Turn::from_plain(&line),
            TurnRepr::Structured { speaker, text } => Turn { speaker, text },
        }
    }
}

/// Ordered, append-only list of prior turns.
///
/// Owned by the client and passed by value with each request; the server
/// keeps no session state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }
}

impl From<Vec<Turn>> for ConversationHistory {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}

impl FromIterator<Turn> for ConversationHistory {
    fn from_iter<I: IntoIterator<Item = Turn>>(iter: I) -> Self {
        Self {
            turns: iter.into_iter().collect(),
        }
    }
}
