use std::sync::Arc;

use axum::{
    extract::{Query, RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::aggregator::{aggregate, FilterCriteria};
use crate::discovery::Discoverer;
use crate::error::NewsError;
use crate::fetcher::Fetcher;
use crate::item::ArticleItem;

pub struct AppState {
    pub fetcher: Fetcher,
    pub discoverer: Discoverer,
    pub max_results: usize,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/fetch-and-filter", get(fetch_and_filter))
        .route("/api/find-rss", get(find_rss))
        .route("/api/fetch-rss", get(fetch_rss))
        .route("/health", get(health))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Error response: status plus a JSON body. Terminal client errors carry only
// `error`; server-side failures add `details`.
pub struct AppError {
    status: StatusCode,
    message: String,
    details: Option<String>,
}

impl AppError {
    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
            details: None,
        }
    }

    fn server(message: &str, err: NewsError) -> Self {
        error!("{}: {}", message, err);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.to_string(),
            details: Some(err.to_string()),
        }
    }

    /// Map a terminal error to its response, using `context` as the
    /// message for server-side failures.
    fn from_news(context: &str, err: NewsError) -> Self {
        match err {
            NewsError::Validation(msg) => Self::bad_request(&msg),
            NewsError::NotFound(msg) => Self {
                status: StatusCode::NOT_FOUND,
                message: msg,
                details: None,
            },
            other => Self::server(context, other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.message, "details": details }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Query for the aggregation endpoint. `feed` may repeat.
#[derive(Debug, Default, PartialEq)]
pub struct AggregateQuery {
    pub feeds: Vec<String>,
    pub keyword: Option<String>,
    pub year: Option<String>,
}

impl AggregateQuery {
    pub fn parse(raw: &str) -> Self {
        let mut query = Self::default();
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "feed" if !value.is_empty() => query.feeds.push(value.into_owned()),
                "keyword" => query.keyword = Some(value.into_owned()),
                "year" => query.year = Some(value.into_owned()),
                _ => {}
            }
        }
        query
    }
}

#[derive(Deserialize)]
pub struct UrlQuery {
    #[serde(default)]
    pub url: Option<String>,
}

impl UrlQuery {
    fn required(self, message: &str) -> Result<String, AppError> {
        self.url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| AppError::bad_request(message))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredFeed {
    pub feed_url: String,
}

// Route handlers
pub async fn fetch_and_filter(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Vec<ArticleItem>>, AppError> {
    let query = AggregateQuery::parse(raw.as_deref().unwrap_or_default());
    let criteria = FilterCriteria::from_raw(query.keyword.as_deref(), query.year.as_deref());

    let items = aggregate(&state.fetcher, &query.feeds, &criteria, state.max_results)
        .await
        .map_err(|e| AppError::from_news("Failed to process RSS feeds", e))?;

    Ok(Json(items))
}

pub async fn find_rss(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UrlQuery>,
) -> Result<Json<DiscoveredFeed>, AppError> {
    let site_url = query.required("site URL is required")?;

    let feed_url = state
        .discoverer
        .discover(&site_url)
        .await
        .map_err(|e| AppError::from_news("Failed to fetch the site page", e))?;

    Ok(Json(DiscoveredFeed { feed_url }))
}

pub async fn fetch_rss(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UrlQuery>,
) -> Result<Json<Vec<ArticleItem>>, AppError> {
    let feed_url = query.required("feed URL is required")?;

    let feed = state
        .fetcher
        .fetch_feed(&feed_url)
        .await
        .map_err(|e| AppError::server("Failed to fetch or parse the RSS feed", e))?;

    Ok(Json(feed.items))
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}
