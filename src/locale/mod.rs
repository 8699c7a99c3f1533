//! Locales: identifiers, bundles, the registry and script-based detection

pub mod bundle;
pub mod registry;
pub mod resolver;

pub use bundle::{
    InsightText, InsightTexts, KeywordSet, KeywordTable, LocaleBundle, MessageTemplates,
    RecommendationCategory, Recommendations, ScriptRange,
};
pub use registry::{LocaleRegistry, BUILTIN_REGISTRY};
pub use resolver::LocaleResolver;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowercase language tag such as `en`, `hi` or `gu`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Locale {
    fn from(code: &str) -> Self {
        Locale::new(code)
    }
}
