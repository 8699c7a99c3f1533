//! Conversation memory
//!
//! Bounded per-session log, the context window handed to the generative
//! backend, and conversation summaries

pub mod context_manager;
pub mod store;
pub mod summarizer;

pub use context_manager::{ContextManager, ContextMessage, MessageRole};
pub use store::{ConversationLog, ConversationTurn, LOG_CAPACITY};
pub use summarizer::{ConversationSummarizer, SummarySource};
