use std::time::Duration;

use feed_rs::parser;
use reqwest::Client;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::NewsError;
use crate::item::RawFeed;

/// Build the shared outbound HTTP client.
pub fn http_client(config: &Config) -> Result<Client, NewsError> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| NewsError::Internal(format!("failed to create HTTP client: {}", e)))
}

/// Fetches and decodes a single RSS/Atom feed.
///
/// Cheap to clone: the underlying client is reference counted.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetch `url` and parse the body as a feed.
    ///
    /// Fails with `Fetch` on transport errors or a non-success status and with
    /// `Parse` when the body is not a feed. A well-formed feed with no entries
    /// is `Ok` with an empty item list.
    pub async fn fetch_feed(&self, url: &str) -> Result<RawFeed, NewsError> {
        info!("Fetching feed: {}", url);

        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;

        let parsed = parser::parse(&bytes[..])?;
        let feed = RawFeed::from(parsed);

        debug!("Parsed {} items from {}", feed.items.len(), url);
        Ok(feed)
    }
}
