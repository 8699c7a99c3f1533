//! Finance Query Engine
//!
//! A multilingual personal-finance assistant that:
//! - Answers questions about a user's own financial records
//! - Only ever sees the categories the user has granted
//! - Detects English, Hindi and Gujarati queries and answers in kind
//! - Plans debt payoff, builds 50/30/20 budgets and surfaces insights
//! - Optionally asks a generative backend first, falling back to the
//!   deterministic engine on any failure
//!
//! PIPELINE:
//! VALIDATE → LOCALE → GREETING? → [BACKEND?] → CLASSIFY → FILTER → SYNTHESIZE

pub mod api;
pub mod assistant;
pub mod budget;
pub mod classifier;
pub mod config;
pub mod debt;
pub mod engine;
pub mod error;
pub mod format;
pub mod gemini;
pub mod insights;
pub mod locale;
pub mod memory;
pub mod models;
pub mod privacy;
pub mod state;
pub mod synthesizer;

pub use error::{AssistantError, Result};

// Re-export common types
pub use assistant::{AssistantReply, FinanceAssistant, ResponseSource};
pub use budget::{build_budget, BudgetPlan};
pub use classifier::{Intent, IntentClassifier};
pub use engine::{QueryEngine, Resolution};
pub use locale::{Locale, LocaleRegistry, LocaleResolver};
pub use models::*;
pub use privacy::{PrivacyFilter, ProfileView};
