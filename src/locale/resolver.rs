//! Picks the response locale for a query

use std::sync::Arc;
use tracing::debug;

use super::{Locale, LocaleRegistry};

/// Script-range detection with an explicit override.
///
/// A valid override always wins. Otherwise the query is scanned left to
/// right and the first character inside a non-default locale's script range
/// selects that locale. Queries with no such character get the default.
#[derive(Debug, Clone)]
pub struct LocaleResolver {
    registry: Arc<LocaleRegistry>,
}

impl LocaleResolver {
    pub fn new(registry: Arc<LocaleRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<LocaleRegistry> {
        &self.registry
    }

    pub fn resolve(&self, query: &str, override_locale: Option<&Locale>) -> Locale {
        if let Some(locale) = override_locale {
            if self.registry.is_supported(locale) {
                return locale.clone();
            }
            debug!(locale = %locale, "Ignoring unsupported locale override");
        }

        self.detect(query)
            .unwrap_or_else(|| self.registry.default_locale().clone())
    }

    /// Script-based detection only, without the default fallback
    pub fn detect(&self, query: &str) -> Option<Locale> {
        let default = self.registry.default_locale();
        let scripted: Vec<_> = self
            .registry
            .bundles()
            .iter()
            .filter(|b| &b.code != default)
            .filter_map(|b| b.script.map(|range| (range, &b.code)))
            .collect();

        if scripted.is_empty() {
            return None;
        }

        query.chars().find_map(|ch| {
            scripted
                .iter()
                .find(|(range, _)| range.contains(ch))
                .map(|(_, code)| (*code).clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> LocaleResolver {
        LocaleResolver::new(LocaleRegistry::shared().unwrap())
    }

    #[test]
    fn test_script_detection() {
        let r = resolver();
        assert_eq!(r.resolve("नमस्ते", None).as_str(), "hi");
        assert_eq!(r.resolve("મારી કુલ સંપત્તિ", None).as_str(), "gu");
        assert_eq!(r.resolve("What are my total assets?", None).as_str(), "en");
        assert_eq!(r.resolve("", None).as_str(), "en");
    }

    #[test]
    fn test_first_matching_character_wins() {
        let r = resolver();
        assert_eq!(r.resolve("EPF બેલેન્સ और बैंक", None).as_str(), "gu");
        assert_eq!(r.resolve("EPF बैंक અને બેલેન્સ", None).as_str(), "hi");
    }

    #[test]
    fn test_override_wins_when_supported() {
        let r = resolver();
        let gu = Locale::new("gu");
        assert_eq!(r.resolve("नमस्ते", Some(&gu)).as_str(), "gu");

        let fr = Locale::new("fr");
        assert_eq!(r.resolve("नमस्ते", Some(&fr)).as_str(), "hi");
        assert_eq!(r.resolve("hello", Some(&fr)).as_str(), "en");
    }

    #[test]
    fn test_result_is_always_configured() {
        let r = resolver();
        for query in ["", "abc", "123 ✓", "नमस्ते", "નમસ્તે", "日本語"] {
            let locale = r.resolve(query, None);
            assert!(r.registry().is_supported(&locale));
        }
    }
}
