//! Instruction builders for the extraction and advice calls.
//!
//! Everything here is a pure function of its inputs so prompt text can be
//! tested without a model.

use health_chat_core::{ConversationHistory, ExtractedRecord};

const EMPTY_HISTORY: &str = "(no previous messages)";

const EXTRACTION_SCHEMA: &str = r#"{
  "age": integer or null,
  "location": string or null,
  "condition": string or null,
  "symptoms": array of strings (empty array if none),
  "isFollowUp": boolean,
  "followUpTopic": string or null
}"#;

/// Render history as one `Speaker: text` line per turn
pub fn render_history(history: &ConversationHistory) -> String {
    if history.is_empty() {
        return EMPTY_HISTORY.to_string();
    }
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.speaker, turn.text.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Instruction asking the model to pull structured health facts out of
/// the newest message.
pub fn extraction_instruction(input: &str, history: &ConversationHistory) -> String {
    format!(
        r#"You extract structured health information from a patient's chat messages.

Conversation so far:
{history}

New message:
{input}

Return ONLY a JSON object with exactly these fields:
{EXTRACTION_SCHEMA}

Rules:
- "age" is the patient's age in years.
- "location" is the place the patient is in, as written.
- "condition" is a named pre-existing condition such as diabetes or asthma.
- "symptoms" lists each symptom as a short phrase, e.g. "stomach hurts".
- If the new message is a follow-up comment or question about an issue discussed earlier, set "isFollowUp" to true, set "followUpTopic" to what is being asked about, and reuse the most recent age, location, condition and symptoms from the conversation instead of extracting them from the new message alone.
- Otherwise set "isFollowUp" to false and "followUpTopic" to null.
- Use null for anything not mentioned. Do not add other fields or any text outside the JSON object."#,
        history = render_history(history),
        input = input.trim(),
    )
}

/// Instruction asking the model for advice, in follow-up or fresh-issue mode
pub fn advice_instruction(record: &ExtractedRecord, history: &ConversationHistory) -> String {
    if record.is_follow_up {
        follow_up_instruction(record, history)
    } else {
        fresh_issue_instruction(record, history)
    }
}

fn follow_up_instruction(record: &ExtractedRecord, history: &ConversationHistory) -> String {
    let topic = record
        .follow_up_topic
        .as_deref()
        .unwrap_or("the patient's latest question");

    format!(
        r#"You are a careful health assistant continuing a conversation with a patient.

Conversation so far:
{history}

The patient is following up about: {topic}

Using the conversation above as context, answer this follow-up directly. Respond with a single section:

Answer:
<your answer>

Do not repeat a symptom-by-symptom breakdown. Remind the patient to consult a medical professional if anything worsens."#,
        history = render_history(history),
    )
}

fn fresh_issue_instruction(record: &ExtractedRecord, history: &ConversationHistory) -> String {
    let mut facts = Vec::new();
    if let Some(age) = record.age {
        facts.push(format!("- Age: {age}"));
    }
    if let Some(location) = &record.location {
        facts.push(format!("- Location: {location}"));
    }
    if let Some(condition) = &record.condition {
        facts.push(format!("- Pre-existing condition: {condition}"));
    }
    if record.symptoms.is_empty() {
        facts.push("- Symptoms: none reported".to_string());
    } else {
        facts.push(format!("- Symptoms: {}", record.symptoms.join(", ")));
    }

    let mut sections = vec!["General Advice:\n<overall advice for this patient>".to_string()];
    if !record.symptoms.is_empty() {
        let lines = record
            .symptoms
            .iter()
            .map(|s| format!("- {s}: <advice for this symptom>"))
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("Symptom Advice:\n{lines}"));
    }
    sections.push(
        "When to Seek Medical Care:\n<specific warning signs and when to see a professional>"
            .to_string(),
    );

    let condition_rule = match &record.condition {
        Some(condition) => format!(
            "\nThe patient has {condition}. Explain how it may interact with the symptoms and adjust the advice accordingly.\n"
        ),
        None => String::new(),
    };

    format!(
        r#"You are a careful health assistant. Give practical, non-diagnostic health advice.

Conversation so far:
{history}

Patient details:
{facts}
{condition_rule}
Respond using these sections:

{sections}"#,
        history = render_history(history),
        facts = facts.join("\n"),
        sections = sections.join("\n\n"),
    )
}
