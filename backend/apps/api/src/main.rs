//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{self, Method, header};
use lms::{DataContext, JsonFileStore, LmsAppState, LmsConfig, lms_router};
use platform::rate_limit::MemoryRateLimitStore;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

const RATE_LIMIT_PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,lms=info,platform=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = LmsConfig::from_env()?;
    tracing::info!(?config, "Configuration loaded");
    if config.uses_insecure_secret() {
        tracing::warn!("Tokens are signed with the development secret");
    }

    // Data directory
    let store = JsonFileStore::new(config.data_dir.clone());
    let data = DataContext::load(store).await?;
    tracing::info!(data_dir = %config.data_dir.display(), "Data loaded");

    let state = LmsAppState::new(data, &config)?;
    spawn_rate_limit_janitor(state.rate_limits.clone(), &config);

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
        ]))
        .allow_credentials(true);

    // Build router
    let app = lms_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Periodically drop rate limit windows that have ended
fn spawn_rate_limit_janitor(store: Arc<MemoryRateLimitStore>, config: &LmsConfig) {
    let window = config.auth_rate_limit.window.max(config.api_rate_limit.window);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let purged = store.purge_expired(window);
            if purged > 0 {
                tracing::debug!(purged, "Rate limit windows purged");
            }
        }
    });
}
