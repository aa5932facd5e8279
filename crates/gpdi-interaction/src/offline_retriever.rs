use async_trait::async_trait;
use gpdi_core::retrieval::{FallbackRetriever, NotFound};

/// Fallback that never reaches the network; every lookup reports a failed search.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineRetriever;

#[async_trait]
impl FallbackRetriever for OfflineRetriever {
    async fn retrieve(&self, query: &str) -> Result<String, NotFound> {
        tracing::debug!(query, "Offline: skipping web search");
        Err(NotFound::SearchFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_search_failed() {
        assert_eq!(
            OfflineRetriever.retrieve("istanbul").await,
            Err(NotFound::SearchFailed)
        );
    }
}
