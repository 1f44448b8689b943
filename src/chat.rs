use serde::Serialize;

use crate::models::{ChatMessage, ChatRole};

pub const PLACEHOLDER_REPLY: &str = "I'm processing your question...";

/// Per-session conversation log. There is no language model behind it; every
/// question gets the same placeholder answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends the question and the placeholder reply. Blank input is ignored.
    pub fn submit(&mut self, message: &str) -> Option<&ChatMessage> {
        if message.trim().is_empty() {
            return None;
        }
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            message: message.to_string(),
        });
        self.messages.push(ChatMessage {
            role: ChatRole::Bot,
            message: PLACEHOLDER_REPLY.to_string(),
        });
        self.messages.last()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_appends_question_then_reply() {
        let mut log = ChatLog::default();
        let reply = log.submit("hello").cloned();
        assert_eq!(
            log.messages(),
            &[
                ChatMessage {
                    role: ChatRole::User,
                    message: "hello".to_string(),
                },
                ChatMessage {
                    role: ChatRole::Bot,
                    message: PLACEHOLDER_REPLY.to_string(),
                },
            ]
        );
        assert_eq!(reply.map(|m| m.message), Some(PLACEHOLDER_REPLY.to_string()));
    }

    #[test]
    fn log_is_append_only_in_order() {
        let mut log = ChatLog::default();
        log.submit("first");
        log.submit("second");
        let users: Vec<_> = log
            .messages()
            .iter()
            .filter(|m| m.role == ChatRole::User)
            .map(|m| m.message.as_str())
            .collect();
        assert_eq!(users, vec!["first", "second"]);
        assert_eq!(log.messages().len(), 4);
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut log = ChatLog::default();
        assert!(log.submit("   ").is_none());
        assert!(log.is_empty());
    }

    #[test]
    fn clear_empties_the_log() {
        let mut log = ChatLog::default();
        log.clear();
        assert!(log.is_empty());
        log.submit("a");
        log.submit("b");
        log.clear();
        assert!(log.is_empty());
    }
}
