//! Fallback retriever that scrapes a site-restricted web search.
//!
//! The query is sent as `site:<site> <query>` and the answer is the text of
//! the first result-summary element on the returned page. All HTML handling
//! stays in this module.

use std::time::Duration;

use async_trait::async_trait;
use gpdi_core::config::SearchConfig;
use gpdi_core::retrieval::{FallbackRetriever, NotFound};
use gpdi_core::{GpdiError, Result};
use reqwest::Client;
use scraper::{Html, Selector};

#[derive(Clone, Debug)]
pub struct WebSearchRetriever {
    client: Client,
    endpoint: String,
    site: String,
    snippet_selector: String,
}

impl WebSearchRetriever {
    /// Builds the HTTP client and checks that the snippet selector parses.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        Selector::parse(&config.snippet_selector).map_err(|e| {
            GpdiError::config(format!(
                "search.snippet_selector '{}' is not a valid selector: {}",
                config.snippet_selector, e
            ))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|err| GpdiError::config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            site: config.site.clone(),
            snippet_selector: config.snippet_selector.clone(),
        })
    }

    fn search_query(&self, query: &str) -> String {
        format!("site:{} {}", self.site, query.trim())
    }
}

#[async_trait]
impl FallbackRetriever for WebSearchRetriever {
    async fn retrieve(&self, query: &str) -> std::result::Result<String, NotFound> {
        let search_query = self.search_query(query);
        tracing::debug!(query = %search_query, "Searching the web");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", search_query.as_str())])
            .send()
            .await
            .map_err(|err| {
                tracing::warn!("Web search request failed: {err}");
                NotFound::SearchFailed
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "Web search returned an error status");
            return Err(NotFound::SearchFailed);
        }

        let body = response.text().await.map_err(|err| {
            tracing::warn!("Failed to read web search body: {err}");
            NotFound::SearchFailed
        })?;

        extract_snippet(&body, &self.snippet_selector).ok_or(NotFound::NoInformation)
    }
}

/// Returns the whitespace-collapsed text of the first element matching
/// `selector`, or `None` when there is no such element or it has no text.
pub fn extract_snippet(html: &str, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let document = Html::parse_document(html);

    let element = document.select(&selector).next()?;
    let text = element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() { None } else { Some(text) }
}
