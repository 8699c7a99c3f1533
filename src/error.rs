//! Error types for the finance query engine

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, AssistantError>;

#[derive(Error, Debug)]
pub enum AssistantError {

    // =============================
    // Core Pipeline Errors
    // =============================

    /// Empty or whitespace-only query. Distinct from a query that simply
    /// matches no intent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Locale registry error: {0}")]
    LocaleRegistry(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Payoff arithmetic failures. Kept apart from "no data" so callers can
/// tell a missing liabilities record from an unusable budget.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DebtPlanError {
    #[error("monthly surplus must be positive, got {0}")]
    NonPositiveSurplus(f64),
}

/// Failures of the optional generative backend. Every variant triggers the
/// deterministic fallback; none is shown to the end user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("backend not configured")]
    NotConfigured,

    #[error("backend timed out after {0} ms")]
    Timeout(u64),

    #[error("backend quota exceeded")]
    QuotaExceeded,

    #[error("backend rate limited")]
    RateLimited,

    #[error("malformed backend response: {0}")]
    Malformed(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("backend transport error: {0}")]
    Http(String),
}

impl BackendError {
    /// Short tag for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::NotConfigured => "not_configured",
            BackendError::Timeout(_) => "timeout",
            BackendError::QuotaExceeded => "quota",
            BackendError::RateLimited => "rate_limit",
            BackendError::Malformed(_) => "malformed",
            BackendError::Unavailable(_) => "unavailable",
            BackendError::Http(_) => "http",
        }
    }
}
