use std::sync::Arc;

use anyhow::Result;
use chrono::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use twitter_api_client::TwitterApiClient;
use voiceprint_api::{app_router, AppState, ProfileService, Toolbox, Tools};
use voiceprint_archive::{PgProfileStore, ProfileCache, ProfileStore};
use voiceprint_common::Config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("voiceprint=info".parse()?))
        .init();

    let (tools, host, port) = match Config::from_env() {
        Ok(config) => {
            let tools = Tools::Ready(Arc::new(build_toolbox(&config).await));
            (tools, config.api_host, config.api_port)
        }
        Err(e) => {
            warn!(error = %e, "Configuration incomplete, starting in setup mode");
            let host = std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
            let port = std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000u16);
            (Tools::Setup(e), host, port)
        }
    };

    let app = app_router(Arc::new(AppState { tools }));

    let addr = format!("{host}:{port}");
    info!("Voiceprint API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_toolbox(config: &Config) -> Toolbox {
    let store: Option<Arc<dyn ProfileStore>> = match &config.database_url {
        Some(url) => match PgProfileStore::connect(url).await {
            Ok(store) => {
                info!("Durable profile cache enabled");
                Some(Arc::new(store))
            }
            Err(e) => {
                warn!(error = %e, "Database unavailable, running with the in-process cache only");
                None
            }
        },
        None => None,
    };

    let cache = Arc::new(ProfileCache::new(
        store,
        config.cache_mode,
        Duration::hours(config.cache_ttl_hours),
    ));
    let source = Arc::new(TwitterApiClient::with_base_url(
        config.twitter_api_key.clone(),
        config.twitter_api_base_url.clone(),
    ));

    info!(
        cache_mode = %config.cache_mode,
        ttl_hours = config.cache_ttl_hours,
        tweet_count = config.tweet_count,
        "Toolbox ready"
    );

    Toolbox::new(
        ProfileService::new(source, cache, config.tweet_count),
        config.summary(),
    )
}
