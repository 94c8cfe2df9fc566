//! Shared application state injected into every handler.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::{AuthService, CountryService};
use crate::domain::repositories::{CountryRepository, TokenRepository};
use crate::infrastructure::cache::CacheService;

/// Services and components shared across requests.
///
/// Cheap to clone: every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub country_service: Arc<CountryService<dyn CountryRepository>>,
    pub auth_service: Arc<AuthService<dyn TokenRepository>>,
    pub cache: Arc<dyn CacheService>,
}

impl AppState {
    /// Wires services over the given storage and cache backends.
    pub fn new(
        country_repository: Arc<dyn CountryRepository>,
        token_repository: Arc<dyn TokenRepository>,
        cache: Arc<dyn CacheService>,
        listing_ttl: Duration,
        token_signing_secret: String,
    ) -> Self {
        let country_service = Arc::new(CountryService::new(
            country_repository,
            cache.clone(),
            listing_ttl,
        ));
        let auth_service = Arc::new(AuthService::new(token_repository, token_signing_secret));

        Self {
            country_service,
            auth_service,
            cache,
        }
    }
}
