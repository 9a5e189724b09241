//! News Aggregator - merge, filter and sort articles from many RSS/Atom feeds
//!
//! The server fetches every requested feed concurrently, tolerates individual
//! feed failures, and returns at most 50 articles newest first. A second
//! endpoint discovers a site's feed from its HTML `<link>` tags. The `client`
//! module holds the user's feed list and renders results.

pub mod aggregator;
pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod fetcher;
pub mod item;
pub mod routes;
pub mod store;
