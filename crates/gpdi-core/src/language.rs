//! Language codes and the translation contract.

use crate::error::{GpdiError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A lowercase ISO 639-1 style language code such as `en` or `tr`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(code: impl AsRef<str>) -> Result<Self> {
        let code = code.as_ref().trim().to_ascii_lowercase();
        let valid = (2..=8).contains(&code.len())
            && code
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '-');
        if !valid {
            return Err(GpdiError::invalid_input(format!(
                "'{}' is not a language code",
                code
            )));
        }
        Ok(Self(code))
    }

    /// For codes baked into the binary, which are known to be well formed.
    pub(crate) fn builtin(code: &'static str) -> Self {
        Self(code.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LanguageCode {
    type Err = GpdiError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = GpdiError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}

/// Translation service used at the language boundary.
///
/// Implementations must return `Err(GpdiError::Translation(..))` when the
/// service cannot be used; `Ok(String::new())` is a legitimate, successful
/// translation of an empty input.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<String>;
}
