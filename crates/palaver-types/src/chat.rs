//! Conversation history types.
//!
//! A `ChatHistory` is the single global conversation the REPL keeps on disk
//! as `{"messages": [{"role", "content", "time"}, ...]}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::llm::MessageRole;

/// One message in the conversation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    pub time: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            time: Utc::now(),
        }
    }
}

/// Ordered, append-only record of the conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHistory {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message stamped with the current time.
    pub fn add(&mut self, role: MessageRole, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(role, content));
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The last `n` messages, oldest first.
    pub fn tail(&self, n: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_appends_in_order() {
        let mut history = ChatHistory::new();
        history.add(MessageRole::User, "hello");
        history.add(MessageRole::Assistant, "hi there");

        assert_eq!(history.len(), 2);
        assert_eq!(history.messages[0].role, MessageRole::User);
        assert_eq!(history.messages[1].content, "hi there");
        assert!(history.messages[0].time <= history.messages[1].time);
    }

    #[test]
    fn test_wire_format() {
        let json = r#"{
          "messages": [
            {"role": "user", "content": "ping", "time": "2024-08-01T10:00:00Z"},
            {"role": "assistant", "content": "pong", "time": "2024-08-01T10:00:02.5+09:00"}
          ]
        }"#;
        let history: ChatHistory = serde_json::from_str(json).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.messages[1].role, MessageRole::Assistant);
        assert_eq!(
            history.messages[1].time.to_rfc3339(),
            "2024-08-01T01:00:02.500+00:00"
        );
    }

    #[test]
    fn test_missing_messages_field_is_empty() {
        let history: ChatHistory = serde_json::from_str("{}").unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn test_tail() {
        let mut history = ChatHistory::new();
        for i in 0..5 {
            history.add(MessageRole::User, format!("m{i}"));
        }
        let tail = history.tail(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].content, "m3");
        assert_eq!(history.tail(10).len(), 5);
    }
}
