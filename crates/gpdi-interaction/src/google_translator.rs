//! Translator backed by the public Google Translate endpoint.
//!
//! The endpoint answers `GET ?client=gtx&sl=..&tl=..&dt=t&q=..` with a loosely
//! typed JSON array whose first element lists the translated segments:
//!
//! ```text
//! [[["Merhaba ", "Hello ", null, null, 10], ["dünya", "world", ...]], null, "en", ...]
//! ```

use std::time::Duration;

use async_trait::async_trait;
use gpdi_core::config::TranslationConfig;
use gpdi_core::language::{LanguageCode, Translator};
use gpdi_core::{GpdiError, Result};
use reqwest::Client;
use serde_json::Value;

#[derive(Clone)]
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(config: &TranslationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| GpdiError::config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }
        if source == target {
            return Ok(text.to_string());
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source.as_str()),
                ("tl", target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(%source, %target, "Translation request failed: {err}");
                GpdiError::translation(format!("request failed: {err}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%source, %target, %status, "Translation service refused request");
            return Err(GpdiError::translation(format!(
                "service returned HTTP {}",
                status.as_u16()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|err| GpdiError::translation(format!("unreadable response: {err}")))?;

        let translated = parse_translation(&payload)?;
        tracing::debug!(%source, %target, "Translated {} chars", text.chars().count());
        Ok(translated)
    }
}

/// Concatenates the first element of every translated segment.
pub fn parse_translation(payload: &Value) -> Result<String> {
    let segments = payload
        .get(0)
        .and_then(|segments| segments.as_array())
        .ok_or_else(|| GpdiError::translation("unexpected response shape"))?;

    Ok(segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(|s| s.as_str()))
        .collect())
}
