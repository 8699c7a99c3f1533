//! Data-driven locale registry
//!
//! Bundles are kept in declaration order; the default bundle doubles as the
//! base language whose keywords always match.

use lazy_static::lazy_static;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{Locale, LocaleBundle};
use crate::error::{AssistantError, Result};

const BUNDLED_EN: &str = include_str!("bundles/en.json");
const BUNDLED_HI: &str = include_str!("bundles/hi.json");
const BUNDLED_GU: &str = include_str!("bundles/gu.json");

lazy_static! {
    /// Built-in registry, parsed once. Holds the error text if a bundled
    /// file fails validation so callers can surface it.
    pub static ref BUILTIN_REGISTRY: std::result::Result<Arc<LocaleRegistry>, String> =
        LocaleRegistry::builtin()
            .map(Arc::new)
            .map_err(|e| e.to_string());
}

#[derive(Debug, Clone)]
pub struct LocaleRegistry {
    bundles: Vec<LocaleBundle>,
    default_index: usize,
}

impl LocaleRegistry {
    /// The bundled `en`, `hi` and `gu` locales with `en` as default
    pub fn builtin() -> Result<Self> {
        let bundles = [BUNDLED_EN, BUNDLED_HI, BUNDLED_GU]
            .into_iter()
            .map(LocaleBundle::from_json)
            .collect::<Result<Vec<_>>>()?;

        Self::from_bundles(bundles, &Locale::new("en"))
    }

    /// Shared handle to the built-in registry
    pub fn shared() -> Result<Arc<LocaleRegistry>> {
        BUILTIN_REGISTRY
            .clone()
            .map_err(AssistantError::LocaleRegistry)
    }

    pub fn from_bundles(bundles: Vec<LocaleBundle>, default: &Locale) -> Result<Self> {
        let mut ordered: Vec<LocaleBundle> = Vec::with_capacity(bundles.len());

        for mut bundle in bundles {
            bundle.code = Locale::new(bundle.code.as_str());
            bundle.validate()?;
            if ordered.iter().any(|b| b.code == bundle.code) {
                return Err(AssistantError::LocaleRegistry(format!(
                    "duplicate locale '{}'",
                    bundle.code
                )));
            }
            ordered.push(bundle);
        }

        let default_index = ordered
            .iter()
            .position(|b| &b.code == default)
            .ok_or_else(|| {
                AssistantError::LocaleRegistry(format!(
                    "default locale '{}' has no bundle",
                    default
                ))
            })?;

        debug!(
            locales = ordered.len(),
            default = %default,
            "Locale registry ready"
        );

        Ok(Self {
            bundles: ordered,
            default_index,
        })
    }

    /// Same bundles with a different default (and base keyword) locale
    pub fn with_default(self, default: &Locale) -> Result<Self> {
        Self::from_bundles(self.bundles, default)
    }

    /// Restrict the registry to a configured subset. The default locale must
    /// remain in the set.
    pub fn with_supported(self, supported: &[Locale]) -> Result<Self> {
        if supported.is_empty() {
            return Ok(self);
        }

        let default = self.default_locale().clone();
        if !supported.contains(&default) {
            return Err(AssistantError::LocaleRegistry(format!(
                "supported locales must include the default '{}'",
                default
            )));
        }

        for locale in supported {
            if self.bundle(locale).is_none() {
                warn!(locale = %locale, "Configured locale has no bundle, skipping");
            }
        }

        let bundles = self
            .bundles
            .into_iter()
            .filter(|b| supported.contains(&b.code))
            .collect();

        Self::from_bundles(bundles, &default)
    }

    /// Add (or replace) bundles from every `*.json` file in a directory
    pub fn load_dir(self, dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let default = self.default_locale().clone();
        let mut bundles = self.bundles;

        let mut paths = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().map(|ext| ext == "json").unwrap_or(false))
            .collect::<Vec<_>>();
        paths.sort();

        for path in paths {
            let raw = std::fs::read_to_string(&path)?;
            let bundle = LocaleBundle::from_json(&raw).map_err(|e| {
                AssistantError::LocaleRegistry(format!("{}: {}", path.display(), e))
            })?;

            info!(locale = %bundle.code, path = %path.display(), "Loaded locale bundle");

            match bundles.iter_mut().find(|b| b.code == bundle.code) {
                Some(existing) => *existing = bundle,
                None => bundles.push(bundle),
            }
        }

        Self::from_bundles(bundles, &default)
    }

    pub fn bundle(&self, locale: &Locale) -> Option<&LocaleBundle> {
        self.bundles.iter().find(|b| &b.code == locale)
    }

    /// Bundle for `locale`, or the default bundle when it is absent or unknown
    pub fn bundle_or_default(&self, locale: Option<&Locale>) -> &LocaleBundle {
        locale
            .and_then(|l| self.bundle(l))
            .unwrap_or_else(|| self.default_bundle())
    }

    pub fn default_bundle(&self) -> &LocaleBundle {
        &self.bundles[self.default_index]
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default_bundle().code
    }

    pub fn is_supported(&self, locale: &Locale) -> bool {
        self.bundle(locale).is_some()
    }

    pub fn locales(&self) -> impl Iterator<Item = &Locale> + '_ {
        self.bundles.iter().map(|b| &b.code)
    }

    pub fn bundles(&self) -> &[LocaleBundle] {
        &self.bundles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::KeywordSet;

    #[test]
    fn test_builtin_registry_is_complete() {
        let registry = LocaleRegistry::builtin().unwrap();
        let codes: Vec<&str> = registry.locales().map(|l| l.as_str()).collect();
        assert_eq!(codes, vec!["en", "hi", "gu"]);
        assert_eq!(registry.default_locale().as_str(), "en");

        for bundle in registry.bundles() {
            for set in KeywordSet::ALL {
                assert!(!bundle.keywords.set(set).is_empty());
            }
        }
    }

    #[test]
    fn test_shared_registry_is_reused() {
        let a = LocaleRegistry::shared().unwrap();
        let b = LocaleRegistry::shared().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_unknown_locale_falls_back_to_default() {
        let registry = LocaleRegistry::builtin().unwrap();
        let bundle = registry.bundle_or_default(Some(&Locale::new("fr")));
        assert_eq!(bundle.code.as_str(), "en");
        assert!(!registry.is_supported(&Locale::new("fr")));
    }

    #[test]
    fn test_supported_subset_keeps_default() {
        let registry = LocaleRegistry::builtin()
            .unwrap()
            .with_supported(&[Locale::new("en"), Locale::new("gu")])
            .unwrap();
        assert!(registry.is_supported(&Locale::new("gu")));
        assert!(!registry.is_supported(&Locale::new("hi")));

        let err = LocaleRegistry::builtin()
            .unwrap()
            .with_supported(&[Locale::new("hi")])
            .unwrap_err();
        assert!(matches!(err, AssistantError::LocaleRegistry(_)));
    }

    #[test]
    fn test_default_can_be_changed() {
        let registry = LocaleRegistry::builtin()
            .unwrap()
            .with_default(&Locale::new("hi"))
            .unwrap();
        assert_eq!(registry.default_locale().as_str(), "hi");
        assert!(LocaleRegistry::builtin()
            .unwrap()
            .with_default(&Locale::new("fr"))
            .is_err());
    }

    #[test]
    fn test_incomplete_bundle_is_rejected() {
        let mut value: serde_json::Value = serde_json::from_str(BUNDLED_EN).unwrap();
        value["messages"]["assets_total"] = serde_json::json!("Your total assets are huge.");
        let err = LocaleBundle::from_json(&value.to_string()).unwrap_err();
        assert!(err.to_string().contains("assets_total"));

        let mut value: serde_json::Value = serde_json::from_str(BUNDLED_EN).unwrap();
        value["keywords"]["travel"] = serde_json::json!([]);
        let err = LocaleBundle::from_json(&value.to_string()).unwrap_err();
        assert!(err.to_string().contains("travel"));
    }

    #[test]
    fn test_missing_template_fails_to_parse() {
        let mut value: serde_json::Value = serde_json::from_str(BUNDLED_HI).unwrap();
        value["messages"]
            .as_object_mut()
            .unwrap()
            .remove("net_worth");
        assert!(LocaleBundle::from_json(&value.to_string()).is_err());
    }

    #[test]
    fn test_load_dir_adds_locale() {
        let dir = std::env::temp_dir().join(format!("locale-bundles-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut value: serde_json::Value = serde_json::from_str(BUNDLED_EN).unwrap();
        value["code"] = serde_json::json!("en-gb");
        value["display_name"] = serde_json::json!("British English");
        std::fs::write(dir.join("en-gb.json"), value.to_string()).unwrap();

        let registry = LocaleRegistry::builtin().unwrap().load_dir(&dir).unwrap();
        assert!(registry.is_supported(&Locale::new("en-gb")));
        assert_eq!(registry.locales().count(), 4);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
