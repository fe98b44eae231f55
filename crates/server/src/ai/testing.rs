//! Scripted model for unit tests

use std::sync::Mutex;

use async_trait::async_trait;

use super::client::{ModelError, TextModel};

/// Answers extraction and advice instructions from a fixed script and
/// records every instruction it receives.
pub(crate) struct ScriptedModel {
    extraction: Option<String>,
    advice: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub(crate) fn new() -> Self {
        Self {
            extraction: Some("{}".to_string()),
            advice: Some("General Advice: rest.".to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn extraction(mut self, reply: &str) -> Self {
        self.extraction = Some(reply.to_string());
        self
    }

    pub(crate) fn failing_extraction(mut self) -> Self {
        self.extraction = None;
        self
    }

    pub(crate) fn advice(mut self, reply: &str) -> Self {
        self.advice = Some(reply.to_string());
        self
    }

    pub(crate) fn failing_advice(mut self) -> Self {
        self.advice = None;
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

fn overloaded() -> ModelError {
    ModelError::Api {
        status: 529,
        message: "Overloaded".to_string(),
    }
}

#[async_trait]
impl TextModel for ScriptedModel {
    async fn generate(&self, instruction: &str) -> Result<String, ModelError> {
        self.calls.lock().unwrap().push(instruction.to_string());
        let reply = if instruction.contains("Return ONLY a JSON object") {
            &self.extraction
        } else {
            &self.advice
        };
        reply.clone().ok_or_else(overloaded)
    }
}
