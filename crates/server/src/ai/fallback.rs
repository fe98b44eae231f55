//! Heuristic field extraction used when model output cannot be parsed.
//!
//! Prefers leaving a field absent over guessing, except for the follow-up
//! flag which is inferred from surface cues.

use std::sync::LazyLock;

use health_chat_core::ExtractedRecord;
use regex::Regex;

static AGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

static LOCATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:at|in)\s+([^.!?\n]+)").expect("valid regex"));

static CONDITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:with|have)\s+(\w+)(?:\s+condition)?").expect("valid regex")
});

static SYMPTOMS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bsymptoms?:\s*([^.!?\n]*)").expect("valid regex"));

static SYMPTOM_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i),|\band\b").expect("valid regex"));

const FOLLOW_UP_CUES: [&str; 2] = ["previous", "earlier"];

/// "I have a fever" names a symptom, not a condition
const ARTICLES: [&str; 3] = ["a", "an", "the"];

/// Build a record from raw user text without a model
pub fn fallback_extract(input: &str) -> ExtractedRecord {
    ExtractedRecord {
        age: age(input),
        location: location(input),
        condition: condition(input),
        symptoms: symptoms(input),
        is_follow_up: is_follow_up(input),
        follow_up_topic: None,
    }
    .normalized()
}

fn age(input: &str) -> Option<u32> {
    AGE_RE.find(input).and_then(|m| m.as_str().parse().ok())
}

fn location(input: &str) -> Option<String> {
    LOCATION_RE
        .captures(input)
        .map(|caps| caps[1].trim().to_string())
}

fn condition(input: &str) -> Option<String> {
    CONDITION_RE
        .captures(input)
        .map(|caps| caps[1].to_string())
        .filter(|word| !ARTICLES.iter().any(|a| word.eq_ignore_ascii_case(a)))
}

fn symptoms(input: &str) -> Vec<String> {
    let Some(caps) = SYMPTOMS_RE.captures(input) else {
        return Vec::new();
    };
    SYMPTOM_SPLIT_RE
        .split(&caps[1])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_follow_up(input: &str) -> bool {
    let lowered = input.to_lowercase();
    FOLLOW_UP_CUES.iter().any(|cue| lowered.contains(cue)) || input.trim().ends_with('?')
}
