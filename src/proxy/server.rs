use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::{HeaderValue, Method},
    middleware,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use super::cache::{LyricsCache, SystemClock};
use super::config::{ProxyConfig, UpstreamKind};
use super::error::LyricsError;
use super::genius::GeniusClient;
use super::requests_logging::{log_requests, RequestsLoggingLevel};
use super::service::LyricsService;
use super::upstream::{LyricsUpstream, LyristClient};

#[derive(Debug, Deserialize)]
struct LyricsQuery {
    q: Option<String>,
}

async fn get_lyrics(
    State(service): State<Arc<LyricsService>>,
    Query(params): Query<LyricsQuery>,
) -> Result<Json<Value>, LyricsError> {
    service.fetch_lyrics(params.q.as_deref()).await.map(Json)
}

async fn health() -> &'static str {
    "ok"
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
}

pub fn make_app(
    service: Arc<LyricsService>,
    cors_origins: &[String],
    logging_level: RequestsLoggingLevel,
) -> Router {
    Router::new()
        .route("/api/lyrics", get(get_lyrics))
        .route("/health", get(health))
        .with_state(service)
        .layer(cors_layer(cors_origins))
        .layer(middleware::from_fn_with_state(logging_level, log_requests))
}

pub fn build_upstream(config: &ProxyConfig) -> Result<Arc<dyn LyricsUpstream>> {
    let upstream: Arc<dyn LyricsUpstream> = match config.upstream {
        UpstreamKind::Lyrist => Arc::new(LyristClient::new(&config.upstream_url, config.timeout)?),
        UpstreamKind::Genius => {
            let token = config
                .genius_token
                .as_deref()
                .context("Missing Genius access token")?;
            Arc::new(GeniusClient::new(token, config.timeout)?)
        }
    };
    Ok(upstream)
}

pub fn build_service(config: &ProxyConfig) -> Result<LyricsService> {
    let cache = LyricsCache::new(
        config.cache_ttl,
        config.cache_max_entries,
        Arc::new(SystemClock),
    );
    Ok(LyricsService::new(
        build_upstream(config)?,
        cache,
        config.pre_delay,
    ))
}

pub async fn run_server(config: ProxyConfig) -> Result<()> {
    let service = Arc::new(build_service(&config)?);
    let app = make_app(service, &config.cors_origins, config.logging_level);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    info!("Proxy server running on port {}", config.port);
    info!("CORS enabled for: {:?}", config.cors_origins);
    info!("Upstream: {:?}", config.upstream);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down");
        })
        .await?;
    Ok(())
}
