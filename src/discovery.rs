use reqwest::Client;
use scraper::{Html, Selector};
use tracing::info;
use url::Url;

use crate::error::NewsError;

/// Feed link types, in order of preference.
const FEED_LINK_SELECTORS: [&str; 2] = [
    r#"link[type="application/rss+xml"]"#,
    r#"link[type="application/atom+xml"]"#,
];

/// Finds the feed advertised by a website's HTML.
#[derive(Clone)]
pub struct Discoverer {
    client: Client,
}

impl Discoverer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetch `site_url` and return the absolute URL of its feed.
    pub async fn discover(&self, site_url: &str) -> Result<String, NewsError> {
        let base = Url::parse(site_url)
            .map_err(|e| NewsError::Validation(format!("invalid site URL '{}': {}", site_url, e)))?;

        info!("Discovering feed for {}", base);

        let response = self
            .client
            .get(base.clone())
            .send()
            .await?
            .error_for_status()?;
        let html = response.text().await?;

        let href = find_feed_href(&html)?.ok_or_else(|| {
            NewsError::NotFound("no RSS or Atom feed found at this URL".to_string())
        })?;

        let feed_url = base.join(&href)?;
        info!("Discovered feed {} for {}", feed_url, site_url);
        Ok(feed_url.to_string())
    }
}

/// The `href` of the first RSS link element, else the first Atom one.
pub fn find_feed_href(html: &str) -> Result<Option<String>, NewsError> {
    let document = Html::parse_document(html);

    for raw in FEED_LINK_SELECTORS {
        let selector = Selector::parse(raw).map_err(|e| NewsError::Parse(e.to_string()))?;
        let href = document
            .select(&selector)
            .filter_map(|el| el.value().attr("href"))
            .map(str::trim)
            .find(|href| !href.is_empty())
            .map(str::to_string);
        if href.is_some() {
            return Ok(href);
        }
    }

    Ok(None)
}
