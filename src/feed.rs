//! Kubernetes CVE feed client.

use async_trait::async_trait;
use tracing::info;

use crate::config::HarvesterConfig;
use crate::model::FeedDocument;
use crate::registry::get_text;
use crate::traits::{FeedSource, HarvestError};

/// Fetches the official CVE feed over HTTP.
pub struct FeedClient {
    feed_url: String,
    http_client: reqwest::Client,
}

impl FeedClient {
    /// # Errors
    ///
    /// Returns [`HarvestError::Fetch`] if the HTTP client cannot be built.
    pub fn new(config: &HarvesterConfig) -> Result<Self, HarvestError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| HarvestError::Fetch {
                url: config.feed_url.clone(),
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            feed_url: config.feed_url.clone(),
            http_client,
        })
    }
}

/// Decodes a feed document body.
pub fn parse_feed(body: &str, source_name: &str) -> Result<FeedDocument, HarvestError> {
    serde_json::from_str(body).map_err(|e| HarvestError::Decode {
        source_name: source_name.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch_feed(&self) -> Result<FeedDocument, HarvestError> {
        info!(url = %self.feed_url, "Fetching k8s CVE feed");
        let body = get_text(&self.http_client, &self.feed_url).await?;
        let feed = parse_feed(&body, &self.feed_url)?;
        info!(items = feed.items.len(), "Feed fetched");
        Ok(feed)
    }
}
