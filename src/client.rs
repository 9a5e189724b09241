//! Client side of the aggregator: the user's feed list, filter inputs and
//! the view rendered from the last request.

use askama::Template;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info, warn};
use url::Url;

use crate::item::{strip_html, ArticleItem};
use crate::store::Store;

/// Storage key for the feed list (JSON array of URLs).
pub const FEEDS_KEY: &str = "rssFeeds";

const NO_FEEDS_MESSAGE: &str = "Add at least one RSS feed URL to search.";
const FETCH_FAILED_MESSAGE: &str = "Failed to fetch news.";
const DISCOVER_FAILED_MESSAGE: &str = "Failed to find a feed for this site.";
const NO_SUMMARY: &str = "Summary not available.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub keyword: String,
    pub year: String,
}

/// One rendered article.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsCard {
    pub title: String,
    pub summary: String,
    pub link: String,
    pub source: String,
    pub tags: Vec<String>,
}

impl NewsCard {
    /// Items without a link cannot be opened and produce no card.
    pub fn from_item(item: &ArticleItem) -> Option<Self> {
        let link = item.link.clone().filter(|l| !l.is_empty())?;

        let summary = item
            .content_snippet
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| {
                item.content
                    .as_deref()
                    .map(strip_html)
                    .filter(|s| !s.is_empty())
            })
            .unwrap_or_else(|| NO_SUMMARY.to_string());

        let source = Url::parse(&link)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.strip_prefix("www.").unwrap_or(h).to_string()))
            .unwrap_or_default();

        Some(Self {
            title: item.title.clone().unwrap_or_default(),
            summary,
            link,
            source,
            tags: item.categories.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Error(String),
    Results(Vec<NewsCard>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientState {
    pub feeds: Vec<String>,
    pub pending_url: String,
    pub filters: Filters,
    pub view: ViewState,
}

impl Default for ClientState {
    fn default() -> Self {
        Self {
            feeds: Vec::new(),
            pending_url: String::new(),
            filters: Filters::default(),
            view: ViewState::Results(Vec::new()),
        }
    }
}

#[derive(Template)]
#[template(path = "news.html")]
struct NewsTemplate<'a> {
    feeds: &'a [String],
    pending_url: &'a str,
    filters: &'a Filters,
    view: &'a ViewState,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    details: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscoveredFeed {
    feed_url: String,
}

/// Calls the aggregation and discovery endpoints.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn fetch_and_filter(
        &self,
        feeds: &[String],
        filters: &Filters,
    ) -> anyhow::Result<Vec<ArticleItem>> {
        let mut params: Vec<(&str, &str)> = feeds.iter().map(|f| ("feed", f.as_str())).collect();
        if !filters.keyword.is_empty() {
            params.push(("keyword", filters.keyword.as_str()));
        }
        if !filters.year.is_empty() {
            params.push(("year", filters.year.as_str()));
        }

        let response = self
            .client
            .get(format!("{}/api/fetch-and-filter", self.base_url))
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let details = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.details);
            anyhow::bail!(details.unwrap_or_else(|| FETCH_FAILED_MESSAGE.to_string()));
        }

        Ok(response.json().await?)
    }

    pub async fn find_rss(&self, site_url: &str) -> anyhow::Result<String> {
        let response = self
            .client
            .get(format!("{}/api/find-rss", self.base_url))
            .query(&[("url", site_url)])
            .send()
            .await?;

        if !response.status().is_success() {
            let details = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.details);
            anyhow::bail!(details.unwrap_or_else(|| DISCOVER_FAILED_MESSAGE.to_string()));
        }

        let body: DiscoveredFeed = response.json().await?;
        Ok(body.feed_url)
    }
}

/// Client state bound to its storage and the backend.
pub struct App {
    store: Store,
    api: ApiClient,
    pub state: ClientState,
}

impl App {
    /// Restore the feed list saved by a previous session.
    pub async fn load(store: Store, api: ApiClient) -> anyhow::Result<Self> {
        let feeds: Vec<String> = match store.get(FEEDS_KEY).await? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Discarding unreadable feed list: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };
        info!("Loaded {} saved feeds", feeds.len());

        Ok(Self {
            store,
            api,
            state: ClientState {
                feeds,
                ..Default::default()
            },
        })
    }

    async fn save(&self) -> anyhow::Result<()> {
        let raw = serde_json::to_string(&self.state.feeds)?;
        self.store.set(FEEDS_KEY, &raw).await
    }

    pub fn set_pending_url(&mut self, url: &str) {
        self.state.pending_url = url.to_string();
    }

    /// Add the pending URL to the feed list. Blank or already listed URLs
    /// are ignored. Returns whether the list changed.
    pub async fn add_feed(&mut self) -> anyhow::Result<bool> {
        let url = self.state.pending_url.trim().to_string();
        if url.is_empty() || self.state.feeds.contains(&url) {
            return Ok(false);
        }

        self.state.feeds.push(url);
        self.state.pending_url.clear();
        self.save().await?;
        Ok(true)
    }

    pub async fn remove_feed(&mut self, url: &str) -> anyhow::Result<()> {
        self.state.feeds.retain(|f| f != url);
        self.save().await
    }

    pub fn set_filters(&mut self, keyword: &str, year: &str) {
        self.state.filters = Filters {
            keyword: keyword.trim().to_string(),
            year: year.trim().to_string(),
        };
    }

    /// Switch to the loading view ahead of a request. With no feeds the
    /// error view is set instead and `false` is returned.
    pub fn begin_fetch(&mut self) -> bool {
        if self.state.feeds.is_empty() {
            self.state.view = ViewState::Error(NO_FEEDS_MESSAGE.to_string());
            return false;
        }

        self.state.view = ViewState::Loading;
        true
    }

    /// Replace the loading view with the outcome of a request.
    pub fn finish_fetch(&mut self, outcome: anyhow::Result<Vec<ArticleItem>>) {
        self.state.view = match outcome {
            Ok(items) => ViewState::Results(items.iter().filter_map(NewsCard::from_item).collect()),
            Err(e) => {
                error!("Fetching news failed: {}", e);
                ViewState::Error(e.to_string())
            }
        };
    }

    pub async fn fetch_news(&mut self) {
        if !self.begin_fetch() {
            return;
        }

        let outcome = self
            .api
            .fetch_and_filter(&self.state.feeds, &self.state.filters)
            .await;
        self.finish_fetch(outcome);
    }

    /// Look up the feed for `site_url` and stage it as the pending URL.
    pub async fn discover(&mut self, site_url: &str) {
        match self.api.find_rss(site_url).await {
            Ok(feed_url) => self.state.pending_url = feed_url,
            Err(e) => {
                error!("Feed discovery failed: {}", e);
                self.state.view = ViewState::Error(e.to_string());
            }
        }
    }

    pub fn render(&self) -> anyhow::Result<String> {
        render(&self.state)
    }
}

pub fn render(state: &ClientState) -> anyhow::Result<String> {
    let template = NewsTemplate {
        feeds: &state.feeds,
        pending_url: &state.pending_url,
        filters: &state.filters,
        view: &state.view,
    };
    Ok(template.render()?)
}
