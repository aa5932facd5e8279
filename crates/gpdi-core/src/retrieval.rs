//! Fallback retrieval contract.
//!
//! The orchestrator calls a [`FallbackRetriever`] only after the fuzzy matcher
//! came back empty. Implementations talk to some external source (a scraped
//! search page, a structured search API) and either produce a short answer or
//! explain why they could not.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the fallback retriever produced no answer.
///
/// The display strings are shown to the user as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotFound {
    /// The request did not complete (transport error, timeout, non-success status).
    SearchFailed,
    /// The request completed but carried nothing we could extract.
    NoInformation,
}

impl NotFound {
    pub fn reason(&self) -> &'static str {
        match self {
            NotFound::SearchFailed => "search failed",
            NotFound::NoInformation => "no information found",
        }
    }
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

impl std::error::Error for NotFound {}

/// External lookup used when the knowledge base has no close match.
///
/// `query` is the user's raw, untranslated input. The returned text is in the
/// knowledge base's canonical language; translating it for display is the
/// caller's job.
#[async_trait]
pub trait FallbackRetriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<String, NotFound>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasons() {
        assert_eq!(NotFound::SearchFailed.to_string(), "search failed");
        assert_eq!(NotFound::NoInformation.to_string(), "no information found");
    }
}
