//! Application configuration model.
//!
//! Mirrors `config.toml`. Every field has a default, so a partial file (or no
//! file at all) yields a usable configuration.

use crate::error::{GpdiError, Result};
use crate::language::LanguageCode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootConfig {
    /// Language the knowledge base is stored in.
    pub canonical_language: LanguageCode,
    /// Language the user types and reads in.
    pub ui_language: LanguageCode,
    /// Languages the user may switch to.
    pub supported_languages: Vec<LanguageCode>,
    pub matching: MatchingConfig,
    pub search: SearchConfig,
    pub translation: TranslationConfig,
    pub storage: StorageConfig,
    pub messages: MessagesConfig,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            canonical_language: lang("tr"),
            ui_language: lang("en"),
            supported_languages: ["en", "es", "fr", "de", "it", "tr"]
                .into_iter()
                .map(lang)
                .collect(),
            matching: MatchingConfig::default(),
            search: SearchConfig::default(),
            translation: TranslationConfig::default(),
            storage: StorageConfig::default(),
            messages: MessagesConfig::default(),
        }
    }
}

impl RootConfig {
    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.matching.similarity_threshold) {
            return Err(GpdiError::config(format!(
                "matching.similarity_threshold must be within [0, 1], got {}",
                self.matching.similarity_threshold
            )));
        }
        if !self.supported_languages.contains(&self.ui_language) {
            return Err(GpdiError::config(format!(
                "ui_language '{}' is not listed in supported_languages",
                self.ui_language
            )));
        }
        if self.search.timeout_secs == 0 || self.translation.timeout_secs == 0 {
            return Err(GpdiError::config("timeouts must be at least one second"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub similarity_threshold: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: crate::knowledge::DEFAULT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search page queried with `q=site:<site> <query>`.
    pub endpoint: String,
    pub site: String,
    /// CSS selector of the result-summary element.
    pub snippet_selector: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.google.com/search".to_string(),
            site: "wikipedia.org".to_string(),
            snippet_selector: "div.BNeawe.s3v9rd.AP7Wnd".to_string(),
            timeout_secs: 10,
            user_agent: concat!("gpdi/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// When false every translation is the identity.
    pub enabled: bool,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the platform data directory.
    pub data_dir: Option<PathBuf>,
}

/// Fixed strings shown by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    /// Shown when nothing could answer the input.
    pub unknown: String,
    /// Shown after a correction has been learned.
    pub learned: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            unknown: "I don't know how to answer this. Please teach me how to respond."
                .to_string(),
            learned: "Thanks! I've learned that now.".to_string(),
        }
    }
}

fn lang(code: &'static str) -> LanguageCode {
    LanguageCode::builtin(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RootConfig::default();
        config.validate().unwrap();
        assert_eq!(config.canonical_language.as_str(), "tr");
        assert_eq!(config.ui_language.as_str(), "en");
        assert_eq!(config.supported_languages.len(), 6);
        assert_eq!(config.matching.similarity_threshold, 0.6);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let config: RootConfig = toml::from_str(
            r#"
ui_language = "de"

[search]
site = "tr.wikipedia.org"
"#,
        )
        .unwrap();

        assert_eq!(config.ui_language.as_str(), "de");
        assert_eq!(config.search.site, "tr.wikipedia.org");
        assert_eq!(config.search.timeout_secs, 10);
        assert!(config.translation.enabled);
        config.validate().unwrap();
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = RootConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: RootConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_unsupported_ui_language_is_rejected() {
        let config = RootConfig {
            ui_language: LanguageCode::new("ja").unwrap(),
            ..RootConfig::default()
        };
        assert!(config.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_invalid_language_code_fails_to_parse() {
        let result: std::result::Result<RootConfig, _> = toml::from_str(r#"ui_language = "e n""#);
        assert!(result.is_err());
    }
}
