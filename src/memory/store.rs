//! Conversation log storage
//!
//! Bounded per-session record of question/answer turns with timestamps

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Turns kept per session before the oldest is evicted
pub const LOG_CAPACITY: usize = 10;

/// One user question and the answer it received
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationTurn {
    pub turn_id: Uuid,
    pub user_text: String,
    pub assistant_text: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(user_text: impl Into<String>, assistant_text: impl Into<String>) -> Self {
        Self {
            turn_id: Uuid::new_v4(),
            user_text: user_text.into(),
            assistant_text: assistant_text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Append-only log with oldest-first eviction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationLog {
    capacity: usize,
    turns: VecDeque<ConversationTurn>,
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }

    /// A zero capacity is bumped to one
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            turns: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a turn, returning the evicted one when the log was full
    pub fn push(&mut self, turn: ConversationTurn) -> Option<ConversationTurn> {
        let evicted = if self.turns.len() >= self.capacity {
            self.turns.pop_front()
        } else {
            None
        };
        self.turns.push_back(turn);
        evicted
    }

    pub fn record(
        &mut self,
        user_text: impl Into<String>,
        assistant_text: impl Into<String>,
    ) -> Option<ConversationTurn> {
        self.push(ConversationTurn::new(user_text, assistant_text))
    }

    /// Oldest to newest
    pub fn turns(&self) -> impl DoubleEndedIterator<Item = &ConversationTurn> + ExactSizeIterator {
        self.turns.iter()
    }

    /// The last `count` turns, oldest first
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &ConversationTurn> {
        let skip = self.turns.len().saturating_sub(count);
        self.turns.iter().skip(skip)
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.back()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
