//! HTTP server initialization and runtime setup.
//!
//! Selects storage and cache backends, applies migrations, and runs the Axum
//! server until a shutdown signal arrives.

use crate::application::services::AuthService;
use crate::config::{CacheBackend, Config, StorageBackend};
use crate::domain::repositories::{CountryRepository, TokenRepository};
use crate::infrastructure::cache::{CacheService, MemoryCache, NullCache, RedisCache};
use crate::infrastructure::persistence::{
    MemoryCountryRepository, MemoryTokenRepository, PgCountryRepository, PgTokenRepository,
};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Storage (PostgreSQL pool with migrations, or in-process)
/// - Listing cache (in-process, Redis, or disabled)
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (country_repository, token_repository) = build_storage(&config).await?;
    let cache = build_cache(&config).await;

    let state = AppState::new(
        country_repository,
        token_repository,
        cache,
        config.listing_cache_ttl(),
        config.token_signing_secret.clone(),
    );

    let app = app_router(state, config.behind_proxy);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn build_storage(
    config: &Config,
) -> Result<(Arc<dyn CountryRepository>, Arc<dyn TokenRepository>)> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for postgres storage")?;

            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
                .idle_timeout(Duration::from_secs(config.db_idle_timeout))
                .max_lifetime(Duration::from_secs(config.db_max_lifetime))
                .connect(database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Migrations applied");

            let pool = Arc::new(pool);
            let countries: Arc<dyn CountryRepository> =
                Arc::new(PgCountryRepository::new(pool.clone()));
            let tokens: Arc<dyn TokenRepository> = Arc::new(PgTokenRepository::new(pool));
            Ok((countries, tokens))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");

            let tokens: Arc<dyn TokenRepository> = Arc::new(MemoryTokenRepository::new());
            if let Some(token) = &config.bootstrap_editor_token {
                AuthService::new(tokens.clone(), config.token_signing_secret.clone())
                    .register_token("bootstrap-editor", token, true)
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to register bootstrap token: {}", e))?;
                tracing::info!("Registered bootstrap editor token");
            }

            let countries: Arc<dyn CountryRepository> = Arc::new(MemoryCountryRepository::new());
            Ok((countries, tokens))
        }
    }
}

/// Builds the listing cache. A Redis connection failure degrades to no caching.
async fn build_cache(config: &Config) -> Arc<dyn CacheService> {
    match (config.cache_backend, &config.redis_url) {
        (CacheBackend::Redis, Some(redis_url)) => match RedisCache::connect(redis_url).await {
            Ok(redis) => {
                tracing::info!("Listing cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        },
        (CacheBackend::Memory, _) => {
            tracing::info!("Listing cache enabled (memory)");
            Arc::new(MemoryCache::new())
        }
        _ => {
            tracing::info!("Listing cache disabled (NullCache)");
            Arc::new(NullCache::new())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = wait_for("Ctrl+C", tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = wait_for("SIGTERM", async {
        let mut signal =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        signal.recv().await;
        Ok::<(), std::io::Error>(())
    });

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Resolves when `signal` fires. A listener that cannot be installed never
/// resolves, so it cannot trigger a shutdown.
async fn wait_for<F>(name: &str, signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!("Failed to listen for {}: {}", name, e);
        std::future::pending::<()>().await;
    }
}
