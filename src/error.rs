use thiserror::Error;

/// Errors produced while aggregating or discovering feeds.
///
/// `Fetch` and `Parse` raised for a single source inside an aggregation are
/// absorbed by the aggregator; everywhere else they reach the caller.
#[derive(Debug, Error)]
pub enum NewsError {
    /// Required input missing or unusable
    #[error("{0}")]
    Validation(String),
    /// No feed link on the discovered page
    #[error("{0}")]
    NotFound(String),
    /// Transport failure or non-success status
    #[error("fetch failed: {0}")]
    Fetch(String),
    /// Malformed feed, HTML or URL
    #[error("parse failed: {0}")]
    Parse(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for NewsError {
    fn from(err: reqwest::Error) -> Self {
        NewsError::Fetch(err.to_string())
    }
}

impl From<feed_rs::parser::ParseFeedError> for NewsError {
    fn from(err: feed_rs::parser::ParseFeedError) -> Self {
        NewsError::Parse(err.to_string())
    }
}

impl From<url::ParseError> for NewsError {
    fn from(err: url::ParseError) -> Self {
        NewsError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_bare() {
        let err = NewsError::Validation("at least one feed URL required".to_string());
        assert_eq!(err.to_string(), "at least one feed URL required");
    }

    #[test]
    fn test_url_error_becomes_parse() {
        let err: NewsError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, NewsError::Parse(_)));
    }
}
