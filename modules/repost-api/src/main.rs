use std::sync::Arc;

use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use repost_common::Config;
use repost_engine::ai::{AiCommentGenerator, CommentBackend, OpenAiBackend};
use repost_engine::analytics::UsageTracker;
use repost_engine::analyzer::Analyzer;
use repost_engine::cache::ResponseCache;
use repost_engine::pipeline::CommentPipeline;
use repost_engine::scrape::HttpBlogScraper;
use repost_engine::store::{KeyValueStore, NoopStore, UpstashStore};

mod rest;

/// Shared state handed to every handler.
pub struct AppState {
    pub analyzer: Analyzer,
    pub tracker: Arc<UsageTracker>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("repost=info".parse()?))
        .init();

    let config = Config::from_env();

    let backend: Option<Arc<dyn CommentBackend>> = match &config.openai_api_key {
        Some(key) => {
            info!(model = %config.openai_model, "AI comment generation enabled");
            Some(Arc::new(OpenAiBackend::new(key, &config.openai_model)))
        }
        None => {
            info!("OPENAI_API_KEY not set, comments come from templates only");
            None
        }
    };

    let store: Arc<dyn KeyValueStore> = match (&config.upstash_url, &config.upstash_token) {
        (Some(url), Some(token)) => {
            info!("Upstash store configured, caching and analytics are on");
            Arc::new(UpstashStore::new(url, token))
        }
        _ => {
            info!("Upstash credentials not set, caching and analytics are off");
            Arc::new(NoopStore)
        }
    };

    let tracker = Arc::new(UsageTracker::new(store.clone()));
    let analyzer = Analyzer::new(
        Arc::new(HttpBlogScraper::new()),
        CommentPipeline::new(AiCommentGenerator::new(backend)),
        ResponseCache::new(store, config.cache_ttl_secs),
        tracker.clone(),
    );

    let app = router(Arc::new(AppState { analyzer, tracker }));

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Repost API listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// The service router, shared by `main` and the handler tests.
fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/api/analyze", post(rest::analyze::api_analyze))
        .route("/api/track", post(rest::api_track))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<axum::body::Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            },
        ))
}

async fn health() -> &'static str {
    "ok"
}
