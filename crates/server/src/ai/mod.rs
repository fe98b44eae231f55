//! Generative-model features powered by the Claude API

pub mod advice;
pub mod client;
pub mod extractor;
pub mod fallback;
pub mod prompt;

pub use advice::{AdviceError, AdviceGenerator};
pub use client::{ClaudeClient, ModelError, TextModel};
pub use extractor::FieldExtractor;

#[cfg(test)]
pub(crate) mod testing;
