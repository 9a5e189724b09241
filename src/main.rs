use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use news_aggregator::config::Config;
use news_aggregator::discovery::Discoverer;
use news_aggregator::fetcher::{http_client, Fetcher};
use news_aggregator::routes::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "news_aggregator=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let mut config = Config::load_or_default("config.toml")?;
    if let Ok(bind) = std::env::var("BIND_ADDR") {
        config.bind = bind;
    }
    info!(
        "Results capped at {}, request timeout {}s",
        config.max_results, config.request_timeout_secs
    );

    let client = http_client(&config)?;
    let state = Arc::new(AppState {
        fetcher: Fetcher::new(client.clone()),
        discoverer: Discoverer::new(client),
        max_results: config.max_results,
    });

    let app = routes::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("Server starting on http://{}", config.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
