//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`        - Health check: storage and cache (public)
//! - `/Countries*`         - Country resource (see [`crate::api::routes`])
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **Authentication** - Bearer token resolved to a caller on country routes
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `behind_proxy` - when `true`, rate limiting reads client IP from
///   `X-Forwarded-For` / `X-Real-IP` headers instead of the peer socket address;
///   enable only when the service runs behind a trusted reverse proxy
pub fn app_router(state: AppState, behind_proxy: bool) -> NormalizePath<Router> {
    let countries = api::routes::country_routes(state.clone());
    let countries = if behind_proxy {
        countries.layer(rate_limit::proxied_layer())
    } else {
        countries.layer(rate_limit::layer())
    };

    let router = Router::new()
        .route("/health", get(health_handler))
        .merge(countries)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
