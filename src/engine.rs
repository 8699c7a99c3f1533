//! Deterministic query engine
//!
//! Validation, locale resolution, greeting short-circuit, intent
//! classification and synthesis wired together. Nothing here performs I/O
//! or keeps state between calls: the same query, profile, grants and
//! override always produce the same answer.

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::budget::{build_budget_for_view, BudgetPlan};
use crate::classifier::{Intent, IntentClassifier};
use crate::error::AssistantError;
use crate::insights::Insight;
use crate::locale::{Locale, LocaleBundle, LocaleRegistry, LocaleResolver};
use crate::models::{AccessGrant, FinancialProfile};
use crate::privacy::PrivacyFilter;
use crate::synthesizer::ResponseSynthesizer;
use crate::Result;

/// A deterministic answer and how it was reached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub text: String,
    pub locale: Locale,
    pub intent: Intent,
}

pub struct QueryEngine {
    registry: Arc<LocaleRegistry>,
    resolver: LocaleResolver,
    classifier: IntentClassifier,
    synthesizer: ResponseSynthesizer,
}

impl QueryEngine {
    pub fn new(registry: Arc<LocaleRegistry>) -> Self {
        Self::with_synthesizer(registry, ResponseSynthesizer::default())
    }

    /// Engine over the bundled locales
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(LocaleRegistry::shared()?))
    }

    pub fn with_synthesizer(registry: Arc<LocaleRegistry>, synthesizer: ResponseSynthesizer) -> Self {
        Self {
            resolver: LocaleResolver::new(registry.clone()),
            classifier: IntentClassifier::new(registry.clone()),
            registry,
            synthesizer,
        }
    }

    pub fn registry(&self) -> &Arc<LocaleRegistry> {
        &self.registry
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    /// Rejects empty and whitespace-only queries before anything else runs
    pub fn validate(query: &str) -> Result<()> {
        if query.trim().is_empty() {
            return Err(AssistantError::InvalidInput(
                "query must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn resolve_locale(&self, query: &str, override_locale: Option<&Locale>) -> Locale {
        self.resolver.resolve(query, override_locale)
    }

    pub fn bundle(&self, locale: &Locale) -> &LocaleBundle {
        self.registry.bundle_or_default(Some(locale))
    }

    /// Greeting reply for the query, if it contains a greeting token
    pub fn greeting_reply(&self, query: &str, locale: &Locale) -> Option<String> {
        let lowered = query.to_lowercase();
        self.classifier
            .is_greeting(&lowered, locale)
            .then(|| ResponseSynthesizer::greeting(self.bundle(locale)))
    }

    pub fn classify(&self, query: &str, locale: &Locale) -> Intent {
        let lowered = query.to_lowercase();
        if self.classifier.is_greeting(&lowered, locale) {
            return Intent::Greeting;
        }
        self.classifier.classify(&lowered, locale)
    }

    /// Full deterministic pipeline for one query
    pub fn answer(
        &self,
        query: &str,
        profile: &FinancialProfile,
        grants: &AccessGrant,
        override_locale: Option<&Locale>,
    ) -> Result<Resolution> {
        Self::validate(query)?;

        let locale = self.resolve_locale(query, override_locale);
        let intent = self.classify(query, &locale);
        debug!(locale = %locale, intent = intent.name(), "Query classified");

        let view = PrivacyFilter::apply(profile, grants);
        let text = self.synthesizer.render(intent, &view, self.bundle(&locale));

        Ok(Resolution {
            text,
            locale,
            intent,
        })
    }

    pub fn insights(
        &self,
        profile: &FinancialProfile,
        grants: &AccessGrant,
        locale: &Locale,
    ) -> Vec<Insight> {
        let view = PrivacyFilter::apply(profile, grants);
        self.synthesizer.insights(&view, self.bundle(locale))
    }

    /// 50/30/20 budget over the transactions the grants expose
    pub fn build_budget(&self, profile: &FinancialProfile, grants: &AccessGrant) -> BudgetPlan {
        let view = PrivacyFilter::apply(profile, grants);
        build_budget_for_view(&view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::AssetsFacet;
    use crate::models::Category;

    fn engine() -> QueryEngine {
        QueryEngine::builtin().unwrap()
    }

    #[test]
    fn test_blank_query_is_invalid_input() {
        let e = engine();
        let profile = FinancialProfile::sample();
        for query in ["", "   ", "\n\t"] {
            let err = e
                .answer(query, &profile, &AccessGrant::all(), None)
                .unwrap_err();
            assert!(matches!(err, AssistantError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_total_assets_answer() {
        let e = engine();
        let res = e
            .answer(
                "What are my total assets?",
                &FinancialProfile::sample(),
                &AccessGrant::all(),
                None,
            )
            .unwrap();

        assert_eq!(res.locale.as_str(), "en");
        assert_eq!(res.intent, Intent::AssetsQuery(AssetsFacet::Total));
        assert!(res.text.contains("330,000"));
        assert!(res
            .text
            .contains(&e.registry().default_bundle().recommendations.assets));
    }

    #[test]
    fn test_hindi_greeting() {
        let e = engine();
        let res = e
            .answer("नमस्ते", &FinancialProfile::sample(), &AccessGrant::all(), None)
            .unwrap();
        let hi = e.registry().bundle(&Locale::new("hi")).unwrap();

        assert_eq!(res.intent, Intent::Greeting);
        assert_eq!(res.locale.as_str(), "hi");
        assert_eq!(res.text, hi.greeting_replies[0]);
    }

    #[test]
    fn test_answer_is_repeatable() {
        let e = engine();
        let profile = FinancialProfile::sample();
        let grants = AccessGrant::all().with(Category::Investments, false);
        let first = e
            .answer("How can I pay off my loan faster?", &profile, &grants, None)
            .unwrap();
        let second = e
            .answer("How can I pay off my loan faster?", &profile, &grants, None)
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(first.intent, Intent::DebtStrategy);
    }

    #[test]
    fn test_override_controls_language() {
        let e = engine();
        let gu = Locale::new("gu");
        let res = e
            .answer(
                "What are my total assets?",
                &FinancialProfile::sample(),
                &AccessGrant::all(),
                Some(&gu),
            )
            .unwrap();
        assert_eq!(res.locale, gu);
        assert!(res.text.contains("330,000"));
    }

    #[test]
    fn test_budget_respects_transactions_grant() {
        let e = engine();
        let profile = FinancialProfile::sample();
        assert!(!e.build_budget(&profile, &AccessGrant::all()).uses_defaults);
        assert!(e.build_budget(&profile, &AccessGrant::none()).uses_defaults);
    }
}
