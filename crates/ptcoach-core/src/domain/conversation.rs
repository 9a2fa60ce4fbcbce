//! Conversation transcript types.

use serde::{Deserialize, Serialize};

/// Who produced a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// The patient.
    User,
    /// The remote conversational agent.
    Agent,
}

/// A single line of the conversation, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn agent(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Agent,
            content: content.into(),
        }
    }
}

/// Exercise volume mentioned during a conversation.
///
/// Each field holds the largest figure mentioned anywhere in the transcript,
/// taking the last mention within each individual message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseMetrics {
    pub sets_completed: u32,
    pub reps_completed: u32,
    pub duration_minutes: u32,
}

impl ExerciseMetrics {
    /// Scan a transcript for `<n> set(s)`, `<n> rep(s)` and `<n> minute(s)`.
    #[must_use]
    pub fn extract(messages: &[ConversationMessage]) -> Self {
        let mut metrics = Self::default();
        for message in messages {
            let content = message.content.to_lowercase();
            if let Some(n) = last_count_before(&content, "set") {
                metrics.sets_completed = metrics.sets_completed.max(n);
            }
            if let Some(n) = last_count_before(&content, "rep") {
                metrics.reps_completed = metrics.reps_completed.max(n);
            }
            if let Some(n) = last_count_before(&content, "minute") {
                metrics.duration_minutes = metrics.duration_minutes.max(n);
            }
        }
        metrics
    }
}

/// Find the last run of digits that is followed (after optional whitespace)
/// by `unit`.
fn last_count_before(text: &str, unit: &str) -> Option<u32> {
    let bytes = text.as_bytes();
    let mut found = None;
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let digits = &text[start..i];
        let rest = text[i..].trim_start();
        if rest.starts_with(unit) {
            if let Ok(n) = digits.parse::<u32>() {
                found = Some(n);
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_largest_mention_across_messages() {
        let transcript = vec![
            ConversationMessage::agent("Let's do 3 sets of 10 reps."),
            ConversationMessage::user("I finished 2 sets, 12 reps each, took 6 minutes"),
            ConversationMessage::user("one more: 1 set"),
        ];
        let metrics = ExerciseMetrics::extract(&transcript);
        assert_eq!(metrics.sets_completed, 3);
        assert_eq!(metrics.reps_completed, 12);
        assert_eq!(metrics.duration_minutes, 6);
    }

    #[test]
    fn takes_last_mention_within_a_message() {
        let transcript = vec![ConversationMessage::user("5 reps then 4 reps")];
        assert_eq!(ExerciseMetrics::extract(&transcript).reps_completed, 4);
    }

    #[test]
    fn unit_may_follow_without_space() {
        let transcript = vec![ConversationMessage::user("did 8reps")];
        assert_eq!(ExerciseMetrics::extract(&transcript).reps_completed, 8);
    }

    #[test]
    fn empty_transcript_yields_zeroes() {
        assert_eq!(ExerciseMetrics::extract(&[]), ExerciseMetrics::default());
    }

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_value(ConversationMessage::agent("hi")).unwrap();
        assert_eq!(json["role"], "agent");
        assert_eq!(json["content"], "hi");
    }
}
