//! Conversation summaries
//!
//! Asks the generative backend for a summary when one is available and
//! falls back to a numbered digest of the last few turns otherwise.

use std::time::Duration;
use tracing::{info, warn};

use crate::format::{render, truncate_chars};
use crate::gemini::GenerativeBackend;
use crate::locale::LocaleBundle;
use crate::memory::context_manager::{ContextManager, ContextMessage, SUMMARY_CONTEXT_TURNS};
use crate::memory::store::ConversationLog;

/// Turns included in the fallback digest
pub const FALLBACK_SUMMARY_TURNS: usize = 5;
pub const QUESTION_PREVIEW_CHARS: usize = 120;
pub const ANSWER_PREVIEW_CHARS: usize = 160;

const SUMMARY_PROMPT: &str = "You are an expert finance assistant. Summarize the conversation below in {language}. \
Include: key questions, direct answers, and 3 actionable next steps. Keep it under 180 words.";

/// Where a summary came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySource {
    Backend,
    Fallback,
    Empty,
}

pub struct ConversationSummarizer;

impl ConversationSummarizer {
    pub fn prompt(bundle: &LocaleBundle) -> String {
        render(SUMMARY_PROMPT, &[("language", bundle.display_name.clone())])
    }

    /// Numbered digest of the last turns, previews trimmed by characters
    pub fn fallback(log: &ConversationLog, bundle: &LocaleBundle) -> String {
        let m = &bundle.messages;

        let lines: Vec<String> = log
            .recent(FALLBACK_SUMMARY_TURNS)
            .enumerate()
            .filter(|(_, t)| !(t.user_text.is_empty() && t.assistant_text.is_empty()))
            .map(|(i, t)| {
                render(
                    &m.summary_line,
                    &[
                        ("index", (i + 1).to_string()),
                        (
                            "question",
                            truncate_chars(&t.user_text, QUESTION_PREVIEW_CHARS).to_string(),
                        ),
                        (
                            "answer",
                            truncate_chars(&t.assistant_text, ANSWER_PREVIEW_CHARS).to_string(),
                        ),
                    ],
                )
            })
            .collect();

        if lines.is_empty() {
            return m.summary_empty.clone();
        }
        format!("{}\n{}", m.summary_header, lines.join("\n"))
    }

    pub async fn summarize(
        log: &ConversationLog,
        bundle: &LocaleBundle,
        backend: Option<&dyn GenerativeBackend>,
        timeout: Duration,
    ) -> (String, SummarySource) {
        if log.is_empty() {
            return (bundle.messages.summary_empty.clone(), SummarySource::Empty);
        }

        if let Some(backend) = backend {
            let transcript = ContextManager::transcript(&ContextManager::prepare_context(
                log,
                SUMMARY_CONTEXT_TURNS,
            ));
            let context = [ContextMessage::user(transcript)];
            let prompt = Self::prompt(bundle);
            let call = backend.generate(&prompt, &context, timeout);

            match tokio::time::timeout(timeout, call).await {
                Ok(Ok(summary)) => {
                    info!(backend = backend.name(), turns = log.len(), "Conversation summarized");
                    return (summary, SummarySource::Backend);
                }
                Ok(Err(e)) => {
                    warn!(backend = backend.name(), kind = e.kind(), "Summary backend failed")
                }
                Err(_) => warn!(backend = backend.name(), kind = "timeout", "Summary backend failed"),
            }
        }

        (Self::fallback(log, bundle), SummarySource::Fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::locale::LocaleRegistry;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl GenerativeBackend for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(
            &self,
            prompt: &str,
            context: &[ContextMessage],
            _timeout: Duration,
        ) -> Result<String, BackendError> {
            Ok(format!("{} | {}", prompt, context[0].content))
        }
    }

    struct Broken;

    #[async_trait]
    impl GenerativeBackend for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        async fn generate(
            &self,
            _prompt: &str,
            _context: &[ContextMessage],
            _timeout: Duration,
        ) -> Result<String, BackendError> {
            Err(BackendError::QuotaExceeded)
        }
    }

    #[test]
    fn test_fallback_digest() {
        let registry = LocaleRegistry::shared().unwrap();
        let bundle = registry.default_bundle();
        let mut log = ConversationLog::new();
        for i in 0..7 {
            log.record(format!("Question {}", i), "A".repeat(200));
        }

        let summary = ConversationSummarizer::fallback(&log, bundle);
        let lines: Vec<&str> = summary.lines().collect();

        assert_eq!(lines[0], bundle.messages.summary_header);
        assert_eq!(lines.len(), 1 + FALLBACK_SUMMARY_TURNS);
        assert!(lines[1].starts_with("1. Q: Question 2 | A: "));
        assert!(lines[1].ends_with(&"A".repeat(ANSWER_PREVIEW_CHARS)));
        assert!(!lines[1].contains(&"A".repeat(ANSWER_PREVIEW_CHARS + 1)));
    }

    #[tokio::test]
    async fn test_empty_log() {
        let registry = LocaleRegistry::shared().unwrap();
        let bundle = registry.default_bundle();
        let (text, source) = ConversationSummarizer::summarize(
            &ConversationLog::new(),
            bundle,
            Some(&Echo),
            Duration::from_secs(1),
        )
        .await;
        assert_eq!(source, SummarySource::Empty);
        assert_eq!(text, bundle.messages.summary_empty);
    }

    #[tokio::test]
    async fn test_backend_summary_names_language() {
        let registry = LocaleRegistry::shared().unwrap();
        let hi = registry.bundle(&crate::locale::Locale::new("hi")).unwrap();
        let mut log = ConversationLog::new();
        log.record("What is my EPF balance?", "Your EPF balance is $100,000.");

        let (text, source) =
            ConversationSummarizer::summarize(&log, hi, Some(&Echo), Duration::from_secs(1)).await;
        assert_eq!(source, SummarySource::Backend);
        assert!(text.contains(&format!("in {}.", hi.display_name)));
        assert!(text.contains("User: What is my EPF balance?"));
    }

    #[tokio::test]
    async fn test_backend_failure_falls_back() {
        let registry = LocaleRegistry::shared().unwrap();
        let bundle = registry.default_bundle();
        let mut log = ConversationLog::new();
        log.record("What is my EPF balance?", "Your EPF balance is $100,000.");

        let (text, source) =
            ConversationSummarizer::summarize(&log, bundle, Some(&Broken), Duration::from_secs(1))
                .await;
        assert_eq!(source, SummarySource::Fallback);
        assert!(text.contains("1. Q: What is my EPF balance?"));
    }
}
