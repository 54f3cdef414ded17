//! Localized question catalog.
//!
//! Each locale provides the ordered question list, a thank-you template with
//! `{name}` and `{email}` placeholders, and the service option labels. The
//! catalog ships embedded in the binary and can be overridden with a JSON
//! file at startup; either way it is validated for completeness before the
//! server accepts traffic.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::CatalogError;
use crate::lead::FieldKey;

/// Locale used when a request carries no (or an unknown) language code.
pub const DEFAULT_LOCALE: &str = "en";

/// Number of questions per locale, one per collected field.
pub const QUESTION_COUNT: usize = FieldKey::ORDER.len();

const BUILTIN_JSON: &str = include_str!("../locales/catalog.json");

/// Question text and labels for one locale.
#[derive(Debug, Clone, Deserialize)]
pub struct LocaleEntry {
    pub questions: Vec<String>,
    pub thank_you: String,
    pub service_options: Vec<String>,
}

/// Validated locale → entry mapping.
#[derive(Debug, Clone)]
pub struct QuestionCatalog {
    locales: HashMap<String, LocaleEntry>,
}

impl QuestionCatalog {
    /// Load the embedded catalog.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_JSON)
    }

    /// Load a catalog from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Parse and validate a catalog from JSON text.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let locales: HashMap<String, LocaleEntry> =
            serde_json::from_str(raw).map_err(|e| CatalogError::Parse(e.to_string()))?;
        let catalog = Self { locales };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Startup completeness check: the default locale exists, and every
    /// locale has exactly [`QUESTION_COUNT`] questions, both thank-you
    /// placeholders, and a non-empty option list.
    fn validate(&self) -> Result<(), CatalogError> {
        if !self.locales.contains_key(DEFAULT_LOCALE) {
            return Err(CatalogError::MissingDefaultLocale(DEFAULT_LOCALE.into()));
        }
        for (locale, entry) in &self.locales {
            if entry.questions.len() != QUESTION_COUNT {
                return Err(CatalogError::QuestionCount {
                    locale: locale.clone(),
                    found: entry.questions.len(),
                    expected: QUESTION_COUNT,
                });
            }
            for placeholder in ["{name}", "{email}"] {
                if !entry.thank_you.contains(placeholder) {
                    return Err(CatalogError::MissingPlaceholder {
                        locale: locale.clone(),
                        placeholder,
                    });
                }
            }
            if entry.service_options.is_empty() {
                return Err(CatalogError::NoServiceOptions {
                    locale: locale.clone(),
                });
            }
        }
        Ok(())
    }

    /// Entry for `lang`, falling back to the default locale for unknown
    /// codes. Already-asked text is never retranslated; only subsequent
    /// responses pick up a language switch.
    pub fn entry(&self, lang: &str) -> &LocaleEntry {
        if let Some(entry) = self.locales.get(lang) {
            return entry;
        }
        tracing::warn!(lang, "no catalog entry for language, falling back");
        // Presence of the default locale is checked in validate().
        self.locales
            .get(DEFAULT_LOCALE)
            .expect("default locale present after validation")
    }

    /// Render the localized thank-you message.
    pub fn thank_you(&self, lang: &str, name: &str, email: &str) -> String {
        self.entry(lang)
            .thank_you
            .replace("{name}", name)
            .replace("{email}", email)
    }

    pub fn locale_codes(&self) -> Vec<&str> {
        self.locales.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_validates() {
        let catalog = QuestionCatalog::builtin().unwrap();
        assert!(catalog.locale_codes().contains(&"en"));
        assert_eq!(catalog.entry("en").questions.len(), QUESTION_COUNT);
    }

    #[test]
    fn unknown_language_falls_back_to_default() {
        let catalog = QuestionCatalog::builtin().unwrap();
        assert_eq!(
            catalog.entry("xx").questions[0],
            catalog.entry(DEFAULT_LOCALE).questions[0]
        );
    }

    #[test]
    fn thank_you_interpolates_both_placeholders() {
        let catalog = QuestionCatalog::builtin().unwrap();
        let text = catalog.thank_you("en", "Alex", "a@b.com");
        assert!(text.contains("Alex"));
        assert!(text.contains("a@b.com"));
        assert!(!text.contains("{name}"));
    }

    #[test]
    fn rejects_wrong_question_count() {
        let raw = r#"{
            "en": {
                "questions": ["only one"],
                "thank_you": "Thanks {name} at {email}",
                "service_options": ["Website"]
            }
        }"#;
        let err = QuestionCatalog::from_json_str(raw).unwrap_err();
        assert!(matches!(err, CatalogError::QuestionCount { found: 1, .. }));
    }

    #[test]
    fn rejects_missing_placeholder() {
        let raw = r#"{
            "en": {
                "questions": ["q1","q2","q3","q4","q5","q6","q7"],
                "thank_you": "Thanks {name}!",
                "service_options": ["Website"]
            }
        }"#;
        let err = QuestionCatalog::from_json_str(raw).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MissingPlaceholder {
                placeholder: "{email}",
                ..
            }
        ));
    }

    #[test]
    fn rejects_empty_service_options() {
        let raw = r#"{
            "en": {
                "questions": ["q1","q2","q3","q4","q5","q6","q7"],
                "thank_you": "Thanks {name} at {email}",
                "service_options": []
            }
        }"#;
        let err = QuestionCatalog::from_json_str(raw).unwrap_err();
        assert!(matches!(err, CatalogError::NoServiceOptions { .. }));
    }

    #[test]
    fn rejects_catalog_without_default_locale() {
        let raw = r#"{
            "hi": {
                "questions": ["q1","q2","q3","q4","q5","q6","q7"],
                "thank_you": "Thanks {name} at {email}",
                "service_options": ["Website"]
            }
        }"#;
        let err = QuestionCatalog::from_json_str(raw).unwrap_err();
        assert!(matches!(err, CatalogError::MissingDefaultLocale(_)));
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            QuestionCatalog::from_json_str("not json").unwrap_err(),
            CatalogError::Parse(_)
        ));
    }
}
