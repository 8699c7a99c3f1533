//! Finance assistant - the public entry point
//!
//! Wraps the deterministic [`QueryEngine`] with the optional generative
//! backend. The backend is tried first when configured; any failure
//! (timeout, quota, rate limit, malformed output, missing key) is logged
//! and the deterministic answer is returned instead. Raw backend errors
//! never reach the user.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::budget::BudgetPlan;
use crate::classifier::Intent;
use crate::config::{AssistantConfig, DEFAULT_BACKEND_TIMEOUT_MS};
use crate::engine::QueryEngine;
use crate::error::{AssistantError, BackendError};
use crate::format::render;
use crate::gemini::GenerativeBackend;
use crate::insights::Insight;
use crate::locale::{Locale, LocaleBundle};
use crate::memory::{
    ContextManager, ContextMessage, ConversationLog, ConversationSummarizer, SummarySource,
};
use crate::models::{AccessGrant, FinancialProfile};
use crate::privacy::PrivacyFilter;
use crate::state::SessionState;
use crate::Result;

const SYSTEM_PROMPT: &str = "You are an expert AI Finance Assistant. Respond in {language}.

Available financial data:
{data}

CORE RESPONSE STRUCTURE:
1. DIRECT ANSWER: Start with a clear, direct answer to the user's question
2. CONTEXTUAL EXPLANATION: Provide detailed context and reasoning
3. ACTIONABLE RECOMMENDATIONS: Always include 2-3 specific, actionable steps
4. FOLLOW-UP SUGGESTIONS: Suggest related actions or next steps

GUIDELINES:
- Use specific numbers from the data above when possible
- Only rely on the data listed above; other categories are not shared with you
- If data is missing, explain what is needed and how to grant access
- Be conversational, encouraging and concise";

/// How a reply was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Greeting,
    Backend,
    Deterministic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantReply {
    pub text: String,
    pub locale: Locale,
    pub source: ResponseSource,
    /// Set for greeting and deterministic replies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
}

pub struct FinanceAssistant {
    engine: QueryEngine,
    backend: Option<Arc<dyn GenerativeBackend>>,
    timeout: Duration,
    context: ContextManager,
}

impl FinanceAssistant {
    /// Deterministic-only assistant
    pub fn new(engine: QueryEngine) -> Self {
        Self {
            engine,
            backend: None,
            timeout: Duration::from_millis(DEFAULT_BACKEND_TIMEOUT_MS),
            context: ContextManager::new(),
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn GenerativeBackend>, timeout: Duration) -> Self {
        self.backend = Some(backend);
        self.timeout = timeout;
        self
    }

    pub fn from_config(config: &AssistantConfig) -> Result<Self> {
        let assistant = Self::new(QueryEngine::new(config.build_registry()?));
        Ok(match config.build_backend() {
            Some(backend) => {
                info!(backend = backend.name(), "Generative backend enabled");
                assistant.with_backend(backend, config.backend_timeout)
            }
            None => {
                info!("No generative backend configured, answering deterministically");
                assistant
            }
        })
    }

    pub fn engine(&self) -> &QueryEngine {
        &self.engine
    }

    pub fn backend_configured(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_deref().map(|b| b.name())
    }

    fn bundle(&self, locale: &Locale) -> &LocaleBundle {
        self.engine.bundle(locale)
    }

    /// Answer one query. `history` only feeds the backend's context window.
    pub async fn resolve(
        &self,
        query: &str,
        profile: &FinancialProfile,
        grants: &AccessGrant,
        override_locale: Option<&Locale>,
        history: &ConversationLog,
    ) -> Result<AssistantReply> {
        QueryEngine::validate(query)?;
        let locale = self.engine.resolve_locale(query, override_locale);

        if let Some(text) = self.engine.greeting_reply(query, &locale) {
            return Ok(AssistantReply {
                text,
                locale,
                source: ResponseSource::Greeting,
                intent: Some(Intent::Greeting),
            });
        }

        if let Some(backend) = &self.backend {
            match self
                .ask_backend(backend.as_ref(), query, profile, grants, &locale, history)
                .await
            {
                Ok(text) => {
                    info!(backend = backend.name(), locale = %locale, "Backend answered");
                    return Ok(AssistantReply {
                        text,
                        locale,
                        source: ResponseSource::Backend,
                        intent: None,
                    });
                }
                Err(e) => {
                    warn!(backend = backend.name(), kind = e.kind(), "Backend failed: {}", e);
                    info!("Falling back to deterministic engine");
                }
            }
        }

        let resolution = self
            .engine
            .answer(query, profile, grants, Some(&locale))?;

        Ok(AssistantReply {
            text: resolution.text,
            locale: resolution.locale,
            source: ResponseSource::Deterministic,
            intent: Some(resolution.intent),
        })
    }

    async fn ask_backend(
        &self,
        backend: &dyn GenerativeBackend,
        query: &str,
        profile: &FinancialProfile,
        grants: &AccessGrant,
        locale: &Locale,
        history: &ConversationLog,
    ) -> std::result::Result<String, BackendError> {
        let view = PrivacyFilter::apply(profile, grants);
        let data = view
            .to_pretty_json()
            .map_err(|e| BackendError::Malformed(format!("profile serialization: {}", e)))?;

        let prompt = render(
            SYSTEM_PROMPT,
            &[
                ("language", self.bundle(locale).display_name.clone()),
                ("data", data),
            ],
        );

        let mut context = self.context.chat_context(history);
        context.push(ContextMessage::user(query));

        let millis = self.timeout.as_millis() as u64;
        tokio::time::timeout(self.timeout, backend.generate(&prompt, &context, self.timeout))
            .await
            .map_err(|_| BackendError::Timeout(millis))?
    }

    /// Answer within a session and append the turn to its log.
    ///
    /// Empty queries are rejected without touching the log. Other failures
    /// become the localized "technical difficulties" reply.
    pub async fn chat(
        &self,
        session: &mut SessionState,
        query: &str,
        profile: &FinancialProfile,
        grants: &AccessGrant,
    ) -> Result<AssistantReply> {
        let reply = match self
            .resolve(query, profile, grants, session.locale.as_ref(), &session.log)
            .await
        {
            Ok(reply) => reply,
            Err(e @ AssistantError::InvalidInput(_)) => return Err(e),
            Err(e) => {
                error!("Chat failed: {}", e);
                let locale = self
                    .engine
                    .resolve_locale(query, session.locale.as_ref());
                AssistantReply {
                    text: self.bundle(&locale).messages.technical_difficulty.clone(),
                    locale,
                    source: ResponseSource::Deterministic,
                    intent: None,
                }
            }
        };

        session.log.record(query, reply.text.clone());
        Ok(reply)
    }

    pub fn insights(
        &self,
        profile: &FinancialProfile,
        grants: &AccessGrant,
        locale: Option<&Locale>,
    ) -> Vec<Insight> {
        let locale = locale
            .filter(|l| self.engine.registry().is_supported(l))
            .cloned()
            .unwrap_or_else(|| self.engine.registry().default_locale().clone());
        self.engine.insights(profile, grants, &locale)
    }

    pub fn build_budget(&self, profile: &FinancialProfile, grants: &AccessGrant) -> BudgetPlan {
        self.engine.build_budget(profile, grants)
    }

    pub async fn summarize(
        &self,
        log: &ConversationLog,
        locale: Option<&Locale>,
    ) -> (String, SummarySource) {
        let bundle = self.engine.registry().bundle_or_default(locale);
        ConversationSummarizer::summarize(log, bundle, self.backend.as_deref(), self.timeout).await
    }
}
