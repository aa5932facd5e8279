use async_trait::async_trait;
use gpdi_core::Result;
use gpdi_core::language::{LanguageCode, Translator};

/// Returns every text unchanged. Used offline and when translation is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

#[async_trait]
impl Translator for IdentityTranslator {
    async fn translate(
        &self,
        text: &str,
        _source: &LanguageCode,
        _target: &LanguageCode,
    ) -> Result<String> {
        Ok(text.to_string())
    }
}
