//! Context window for the generative backend
//!
//! Flattens the most recent turns of a [`ConversationLog`] into role-tagged
//! messages. Only the backend consumes this; the deterministic path ignores
//! history entirely.

use serde::{Deserialize, Serialize};

use crate::memory::store::ConversationLog;

/// Turns handed to the backend alongside a chat prompt
pub const CHAT_CONTEXT_TURNS: usize = 6;

/// Turns handed to the backend when summarizing
pub const SUMMARY_CONTEXT_TURNS: usize = 12;

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn label(&self) -> &'static str {
        match self {
            MessageRole::User => "User",
            MessageRole::Assistant => "Assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ContextMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ContextConfig {
    pub chat_turns: usize,
    pub summary_turns: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            chat_turns: CHAT_CONTEXT_TURNS,
            summary_turns: SUMMARY_CONTEXT_TURNS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContextManager {
    config: ContextConfig,
}

impl ContextManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ContextConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Last `turns` turns as alternating user/assistant messages, oldest first
    pub fn prepare_context(log: &ConversationLog, turns: usize) -> Vec<ContextMessage> {
        log.recent(turns)
            .flat_map(|t| {
                [
                    ContextMessage::user(t.user_text.clone()),
                    ContextMessage::assistant(t.assistant_text.clone()),
                ]
            })
            .collect()
    }

    pub fn chat_context(&self, log: &ConversationLog) -> Vec<ContextMessage> {
        Self::prepare_context(log, self.config.chat_turns)
    }

    pub fn summary_context(&self, log: &ConversationLog) -> Vec<ContextMessage> {
        Self::prepare_context(log, self.config.summary_turns)
    }

    /// Plain-text transcript, one "Role: text" line per message
    pub fn transcript(messages: &[ContextMessage]) -> String {
        messages
            .iter()
            .map(|m| format!("{}: {}", m.role.label(), m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_with(n: usize) -> ConversationLog {
        let mut log = ConversationLog::new();
        for i in 0..n {
            log.record(format!("Question {}", i), format!("Answer {}", i));
        }
        log
    }

    #[test]
    fn test_chat_context_takes_last_six_turns() {
        let manager = ContextManager::new();
        let context = manager.chat_context(&log_with(9));

        assert_eq!(context.len(), CHAT_CONTEXT_TURNS * 2);
        assert_eq!(context[0], ContextMessage::user("Question 3"));
        assert_eq!(context[1], ContextMessage::assistant("Answer 3"));
        assert_eq!(context.last().unwrap().content, "Answer 8");
    }

    #[test]
    fn test_summary_context_bounded_by_log() {
        let manager = ContextManager::new();
        // The log itself holds at most ten turns
        assert_eq!(manager.summary_context(&log_with(15)).len(), 20);
        assert!(manager.chat_context(&ConversationLog::new()).is_empty());
    }

    #[test]
    fn test_transcript() {
        let text = ContextManager::transcript(&ContextManager::prepare_context(&log_with(1), 6));
        assert_eq!(text, "User: Question 0\nAssistant: Answer 0");
    }
}
