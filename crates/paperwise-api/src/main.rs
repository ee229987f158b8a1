//! paperwise-api - HTTP API server for paperwise

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paperwise_api::services::RedisRecommendationStore;
use paperwise_api::{router, AppState};
use paperwise_core::{CandidateSource, RecommendationStore};
use paperwise_db::{Database, PoolConfig};
use paperwise_inference::{GenerationBackend, LlmRanker, LlmSemanticAnnotator, OllamaBackend};
use paperwise_recommend::{RankingStrategy, RecommendationConfig, RecommendationOrchestrator};
use paperwise_sources::{ChainedSource, PubMedSource};

fn env_flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

/// Parse `ALLOWED_ORIGINS` (comma separated); defaults to localhost dev origins.
fn parse_allowed_origins() -> Vec<HeaderValue> {
    let raw = std::env::var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "paperwise_api=debug,paperwise_recommend=debug,tower_http=debug".into()
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("paperwise-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    // Server configuration
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/paperwise".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(paperwise_core::defaults::SERVER_PORT);

    let config = RecommendationConfig::load()?;
    info!(
        min_papers_per_section = config.min_papers_per_section,
        cache_ttl_secs = config.cache_ttl_secs,
        "Recommendation config loaded"
    );

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect_with_config(&database_url, PoolConfig::from_env()).await?;
    db.migrate().await?;
    info!("Database connected");

    // Candidate sources: PubMed first, ingested articles as fallback
    let mut sources: Vec<Arc<dyn CandidateSource>> = Vec::new();
    if env_flag("PUBMED_ENABLED", true) {
        sources.push(Arc::new(PubMedSource::from_env()?));
        info!("PubMed source enabled");
    }
    sources.push(db.articles.clone());
    let source = Arc::new(ChainedSource::new(sources));

    let mut builder = RecommendationOrchestrator::builder(db.signals.clone(), source)
        .with_config(config);

    if let Some(store) = RedisRecommendationStore::from_env().await {
        builder = builder.with_cache_store(Arc::new(store) as Arc<dyn RecommendationStore>);
    }

    if env_flag("LLM_ENABLED", false) {
        let backend: Arc<dyn GenerationBackend> = Arc::new(OllamaBackend::from_env()?);
        info!(model = backend.model_name(), "LLM ranking and annotation enabled");
        builder = builder
            .with_ranking(RankingStrategy::Llm(Arc::new(LlmRanker::new(backend.clone()))))
            .with_annotator(Arc::new(LlmSemanticAnnotator::new(backend)));
    }

    let orchestrator = Arc::new(builder.build()?);
    let state = AppState::new(orchestrator.clone());

    let app = router(state).layer(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(parse_allowed_origins()))
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                header::ACCEPT,
                HeaderName::from_static("x-user-id"),
            ])
            .max_age(std::time::Duration::from_secs(3600)),
    );

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The cache lives as long as the process
    if let Err(e) = orchestrator.clear_cache().await {
        warn!("Failed to clear recommendation cache on shutdown: {}", e);
    }
    info!("Server stopped");
    Ok(())
}
