use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shop_clients_api::cache::{ProfileCache, SystemClock};
use shop_clients_api::config::Config;
use shop_clients_api::handlers::{self, AppState};
use shop_clients_api::record_store::SheetsRecordStore;

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - The spreadsheet record store client.
/// - The client profile cache.
/// - HTTP routes and middleware (CORS, Rate Limiting).
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shop_clients_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    let record_store = SheetsRecordStore::new(&config)?;
    tracing::info!("Sheets record store client initialized");

    // Profiles are resolved lazily on the first search
    let profile_cache = Arc::new(ProfileCache::new(
        Arc::new(record_store),
        config.clients_sheet.clone(),
        config.cache_ttl(),
        Arc::new(SystemClock),
    ));
    tracing::info!(
        "Client profile cache initialized ({}s TTL, sheet '{}')",
        profile_cache.ttl().as_secs(),
        profile_cache.sheet()
    );

    // Build application state
    let app_state = Arc::new(AppState { profile_cache });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    // Build protected routes with security layers
    let protected_routes = Router::new()
        .route("/api/v1/clients/search", get(handlers::search_clients))
        .route("/api/v1/clients/cache", get(handlers::cache_status))
        .route(
            "/api/v1/clients/cache/invalidate",
            post(handlers::invalidate_cache),
        )
        .layer(
            ServiceBuilder::new()
                // Request size limit: 64KB max payload
                .layer(RequestBodyLimitLayer::new(64 * 1024))
                // Rate limiting: 10 req/sec per IP, burst of 20
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Build final app with health check (bypasses rate limiting)
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // SmartIpKeyExtractor falls back to the peer address
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
