//! Environment configuration
//!
//! Every setting has a default, so an empty environment yields a working
//! deterministic assistant. Values that fail to parse are logged and
//! replaced by their default.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::gemini::{GeminiBackend, GenerativeBackend, DEFAULT_GEMINI_URL};
use crate::locale::{Locale, LocaleRegistry};
use crate::models::FinancialProfile;
use crate::error::AssistantError;
use crate::Result;

pub const DEFAULT_BACKEND_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_PORT: u16 = 8080;

/// Placeholder shipped in example env files; treated as "no key"
const PLACEHOLDER_KEY: &str = "your_gemini_api_key_here";

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_model_url: String,
    pub backend_timeout: Duration,
    pub default_locale: Locale,
    /// Empty means every loaded locale
    pub supported_locales: Vec<Locale>,
    pub locale_dir: Option<PathBuf>,
    pub profile_path: Option<PathBuf>,
    pub port: u16,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model_url: DEFAULT_GEMINI_URL.to_string(),
            backend_timeout: Duration::from_millis(DEFAULT_BACKEND_TIMEOUT_MS),
            default_locale: Locale::new("en"),
            supported_locales: vec![],
            locale_dir: None,
            profile_path: None,
            port: DEFAULT_PORT,
        }
    }
}

impl AssistantConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let gemini_api_key = get("GEMINI_API_KEY").filter(|k| k != PLACEHOLDER_KEY);

        let backend_timeout = get("BACKEND_TIMEOUT_MS")
            .and_then(|raw| parse_or_warn::<u64>("BACKEND_TIMEOUT_MS", &raw))
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.backend_timeout);

        let port = get("PORT")
            .or_else(|| get("API_PORT"))
            .and_then(|raw| parse_or_warn::<u16>("PORT", &raw))
            .unwrap_or(defaults.port);

        let supported_locales = get("SUPPORTED_LOCALES")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(Locale::new)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            gemini_api_key,
            gemini_model_url: get("GEMINI_MODEL_URL").unwrap_or(defaults.gemini_model_url),
            backend_timeout,
            default_locale: get("DEFAULT_LOCALE")
                .map(Locale::new)
                .unwrap_or(defaults.default_locale),
            supported_locales,
            locale_dir: get("LOCALE_DIR").map(PathBuf::from),
            profile_path: get("PROFILE_PATH").map(PathBuf::from),
            port,
        }
    }

    /// Bundled locales, plus any directory bundles, narrowed to the
    /// supported set. An unusable default falls back to the bundled one.
    pub fn build_registry(&self) -> Result<Arc<LocaleRegistry>> {
        let mut registry = LocaleRegistry::builtin()?;

        if let Some(dir) = &self.locale_dir {
            registry = registry.load_dir(dir)?;
        }

        if registry.default_locale() != &self.default_locale {
            if registry.is_supported(&self.default_locale) {
                registry = registry.with_default(&self.default_locale)?;
            } else {
                warn!(
                    locale = %self.default_locale,
                    "Configured default locale has no bundle, keeping '{}'",
                    registry.default_locale()
                );
            }
        }

        let mut supported = self.supported_locales.clone();
        if !supported.is_empty() && !supported.contains(registry.default_locale()) {
            warn!(
                locale = %registry.default_locale(),
                "SUPPORTED_LOCALES leaves out the default locale, adding it"
            );
            supported.push(registry.default_locale().clone());
        }

        let registry = registry.with_supported(&supported)?;
        info!(
            locales = registry.locales().count(),
            default = %registry.default_locale(),
            "Locales configured"
        );
        Ok(Arc::new(registry))
    }

    /// The Gemini backend when a key is configured
    pub fn build_backend(&self) -> Option<Arc<dyn GenerativeBackend>> {
        let key = self.gemini_api_key.as_deref()?;
        match GeminiBackend::with_url(key, &self.gemini_model_url) {
            Ok(backend) => Some(Arc::new(backend)),
            Err(e) => {
                warn!(kind = e.kind(), "Generative backend disabled: {}", e);
                None
            }
        }
    }

    /// Profile from `PROFILE_PATH`, or the demonstration profile
    pub fn load_profile(&self) -> Result<FinancialProfile> {
        match &self.profile_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    AssistantError::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                let profile = serde_json::from_str(&raw).map_err(|e| {
                    AssistantError::Config(format!("invalid profile {}: {}", path.display(), e))
                })?;
                info!(path = %path.display(), "Loaded financial profile");
                Ok(profile)
            }
            None => Ok(FinancialProfile::sample()),
        }
    }
}

fn parse_or_warn<T: std::str::FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = raw, "Invalid configuration value, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> AssistantConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AssistantConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]);
        assert!(cfg.gemini_api_key.is_none());
        assert_eq!(cfg.backend_timeout, Duration::from_millis(5_000));
        assert_eq!(cfg.default_locale.as_str(), "en");
        assert_eq!(cfg.port, 8080);
        assert!(cfg.build_backend().is_none());
    }

    #[test]
    fn test_values_and_invalid_fallbacks() {
        let cfg = config(&[
            ("GEMINI_API_KEY", "your_gemini_api_key_here"),
            ("BACKEND_TIMEOUT_MS", "soon"),
            ("API_PORT", "9090"),
            ("SUPPORTED_LOCALES", "en, gu ,"),
            ("DEFAULT_LOCALE", " EN "),
        ]);
        assert!(cfg.gemini_api_key.is_none());
        assert_eq!(cfg.backend_timeout, Duration::from_millis(5_000));
        assert_eq!(cfg.port, 9090);
        assert_eq!(
            cfg.supported_locales,
            vec![Locale::new("en"), Locale::new("gu")]
        );

        let registry = cfg.build_registry().unwrap();
        assert!(!registry.is_supported(&Locale::new("hi")));
    }

    #[test]
    fn test_unknown_default_locale_is_ignored() {
        let registry = config(&[("DEFAULT_LOCALE", "fr")]).build_registry().unwrap();
        assert_eq!(registry.default_locale().as_str(), "en");

        let registry = config(&[("DEFAULT_LOCALE", "gu")]).build_registry().unwrap();
        assert_eq!(registry.default_locale().as_str(), "gu");
    }

    #[test]
    fn test_supported_locales_keep_default() {
        let registry = config(&[("SUPPORTED_LOCALES", "hi,gu")])
            .build_registry()
            .unwrap();
        assert_eq!(registry.default_locale().as_str(), "en");
        assert!(registry.is_supported(&Locale::new("en")));
        assert!(registry.is_supported(&Locale::new("hi")));
        assert!(registry.is_supported(&Locale::new("gu")));

        let registry = config(&[("DEFAULT_LOCALE", "gu"), ("SUPPORTED_LOCALES", "en")])
            .build_registry()
            .unwrap();
        assert_eq!(registry.default_locale().as_str(), "gu");
        assert!(!registry.is_supported(&Locale::new("hi")));
    }

    #[test]
    fn test_backend_built_from_key() {
        let cfg = config(&[("GEMINI_API_KEY", "test-key"), ("BACKEND_TIMEOUT_MS", "1500")]);
        assert_eq!(cfg.backend_timeout, Duration::from_millis(1_500));
        assert_eq!(cfg.build_backend().unwrap().name(), "gemini");
    }

    #[test]
    fn test_profile_defaults_to_sample() {
        assert_eq!(config(&[]).load_profile().unwrap(), FinancialProfile::sample());
    }

    #[test]
    fn test_unreadable_profile_is_config_error() {
        let err = config(&[("PROFILE_PATH", "/nonexistent/profile.json")])
            .load_profile()
            .unwrap_err();
        match err {
            AssistantError::Config(msg) => assert!(msg.contains("/nonexistent/profile.json")),
            other => panic!("unexpected error: {}", other),
        }
    }
}
