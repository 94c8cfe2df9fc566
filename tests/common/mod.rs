#![allow(dead_code)]

use axum::{Router, routing::get};
use axum_test::TestServer;
use std::sync::Arc;
use std::time::Duration;
use country_api::api::handlers::health_handler;
use country_api::api::routes::country_routes;
use country_api::application::services::auth_service::hash_token;
use country_api::domain::entities::NewCountry;
use country_api::domain::repositories::{CountryRepository, TokenRepository};
use country_api::infrastructure::cache::{CacheService, MemoryCache};
use country_api::infrastructure::persistence::{MemoryCountryRepository, MemoryTokenRepository};
use country_api::state::AppState;

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const EDITOR_TOKEN: &str = "editor-token";
pub const READER_TOKEN: &str = "reader-token";
pub const REVOKED_TOKEN: &str = "revoked-token";

/// Test server over in-memory storage and cache, with handles for inspection.
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub countries: Arc<MemoryCountryRepository>,
    pub cache: Arc<MemoryCache>,
}

impl TestApp {
    pub async fn new() -> Self {
        let countries = Arc::new(MemoryCountryRepository::new());
        let tokens = Arc::new(MemoryTokenRepository::new());
        let cache = Arc::new(MemoryCache::new());

        tokens
            .create_token("editor", &hash_token(SIGNING_SECRET, EDITOR_TOKEN), true)
            .await
            .unwrap();
        tokens
            .create_token("reader", &hash_token(SIGNING_SECRET, READER_TOKEN), false)
            .await
            .unwrap();
        let revoked = tokens
            .create_token("revoked", &hash_token(SIGNING_SECRET, REVOKED_TOKEN), true)
            .await
            .unwrap();
        tokens.revoke_token(revoked.id).await.unwrap();

        let state = AppState::new(
            countries.clone(),
            tokens,
            cache.clone() as Arc<dyn CacheService>,
            Duration::from_secs(600),
            SIGNING_SECRET.to_string(),
        );

        let app = Router::new()
            .route("/health", get(health_handler))
            .merge(country_routes(state.clone()))
            .with_state(state.clone());

        Self {
            server: TestServer::new(app).unwrap(),
            state,
            countries,
            cache,
        }
    }

    /// Stores countries directly, bypassing the API.
    pub async fn seed(&self, rows: &[(&str, &str, &str)]) {
        for (entity_id, name, iso_code) in rows {
            self.countries
                .insert(NewCountry {
                    entity_id: entity_id.to_string(),
                    name: name.to_string(),
                    iso_code: iso_code.to_string(),
                })
                .await
                .unwrap();
        }
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
