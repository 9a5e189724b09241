use std::cmp::Reverse;

use chrono::Datelike;
use futures::future::join_all;
use tracing::{info, warn};

use crate::error::NewsError;
use crate::fetcher::Fetcher;
use crate::item::ArticleItem;

pub const MAX_RESULTS: usize = 50;

/// Optional post-filters. Every supplied criterion must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub keyword: Option<String>,
    pub year: Option<i32>,
}

impl FilterCriteria {
    /// Build criteria from raw query values. Blank keywords and years that
    /// are not integers impose no constraint.
    pub fn from_raw(keyword: Option<&str>, year: Option<&str>) -> Self {
        let keyword = keyword
            .filter(|k| !k.is_empty())
            .map(|k| k.to_string());
        let year = year.and_then(|y| y.trim().parse::<i32>().ok());
        Self { keyword, year }
    }

    fn matches_keyword(&self, item: &ArticleItem) -> bool {
        let Some(keyword) = &self.keyword else {
            return true;
        };
        item.title
            .as_deref()
            .is_some_and(|t| t.to_lowercase().contains(&keyword.to_lowercase()))
    }

    fn matches_year(&self, item: &ArticleItem) -> bool {
        let Some(year) = self.year else {
            return true;
        };
        item.published().is_some_and(|dt| dt.year() == year)
    }

    pub fn matches(&self, item: &ArticleItem) -> bool {
        self.matches_keyword(item) && self.matches_year(item)
    }
}

/// Filter, sort newest first and truncate a merged item list.
///
/// Items without a usable date sort after every dated item and keep their
/// relative order.
pub fn refine(items: Vec<ArticleItem>, criteria: &FilterCriteria, limit: usize) -> Vec<ArticleItem> {
    let mut items: Vec<ArticleItem> = items
        .into_iter()
        .filter(|item| criteria.matches(item))
        .collect();

    items.sort_by_cached_key(|item| Reverse(item.published()));
    items.truncate(limit);
    items
}

/// Fetch every source concurrently, merge, filter, sort and truncate.
///
/// A source that fails contributes nothing; the failure is logged and the
/// remaining sources carry on. Only an empty source list is an error.
pub async fn aggregate(
    fetcher: &Fetcher,
    sources: &[String],
    criteria: &FilterCriteria,
    limit: usize,
) -> Result<Vec<ArticleItem>, NewsError> {
    if sources.is_empty() {
        return Err(NewsError::Validation(
            "at least one feed URL required".to_string(),
        ));
    }

    info!("Aggregating {} feeds", sources.len());

    let handles = sources.iter().map(|url| {
        let fetcher = fetcher.clone();
        let url = url.clone();
        tokio::spawn(async move { fetcher.fetch_feed(&url).await })
    });

    let settled = join_all(handles).await;

    let mut merged = Vec::new();
    for (url, outcome) in sources.iter().zip(settled) {
        match outcome {
            Ok(Ok(feed)) => merged.extend(feed.items),
            Ok(Err(e)) => warn!("Failed to fetch feed '{}': {}", url, e),
            Err(e) => warn!("Fetch task for feed '{}' aborted: {}", url, e),
        }
    }

    let total = merged.len();
    let result = refine(merged, criteria, limit);
    info!("Returning {} of {} merged items", result.len(), total);

    Ok(result)
}
