//! Country lookup, listing, and mutation service.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, warn};
use validator::Validate;

use crate::application::services::query_translator::{MarkerQueryTranslator, QueryTranslator};
use crate::domain::entities::{Country, CountryPatch, CountryReference, NewCountry};
use crate::domain::query::{CountryQuery, QueryOptions};
use crate::domain::repositories::CountryRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Cache key of the full, name-sorted listing.
pub const COUNTRY_LISTING_KEY: &str = "countries:all";

/// Default lifetime of the cached listing.
pub const DEFAULT_LISTING_TTL: Duration = Duration::from_secs(600);

/// Service for the country resource.
///
/// Owns the listing cache: the unfiltered listing is read through it, and
/// every successful mutation invalidates it. Cache failures never fail a
/// request.
pub struct CountryService<R: CountryRepository + ?Sized> {
    repository: Arc<R>,
    cache: Arc<dyn CacheService>,
    translator: Arc<dyn QueryTranslator>,
    listing_ttl: Duration,
}

impl<R: CountryRepository + ?Sized> CountryService<R> {
    /// Creates a service using the marker-based query translator.
    pub fn new(repository: Arc<R>, cache: Arc<dyn CacheService>, listing_ttl: Duration) -> Self {
        Self {
            repository,
            cache,
            translator: Arc::new(MarkerQueryTranslator),
            listing_ttl,
        }
    }

    /// Replaces the query translator.
    pub fn with_translator(mut self, translator: Arc<dyn QueryTranslator>) -> Self {
        self.translator = translator;
        self
    }

    /// Returns every country ascending by name, served from cache when possible.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn list_countries(&self) -> Result<Vec<CountryReference>, AppError> {
        if let Some(cached) = self.cached_listing().await {
            metrics::counter!("country_listing_cache_hits_total").increment(1);
            return Ok(cached);
        }
        metrics::counter!("country_listing_cache_misses_total").increment(1);

        let countries = self
            .repository
            .find_many(&CountryQuery::sorted_by_name())
            .await?;
        let listing: Vec<CountryReference> = countries.iter().map(CountryReference::from).collect();

        match serde_json::to_string(&listing) {
            Ok(serialized) => {
                if let Err(e) = self
                    .cache
                    .set(COUNTRY_LISTING_KEY, &serialized, self.listing_ttl)
                    .await
                {
                    warn!("Failed to cache country listing: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize country listing: {}", e),
        }

        Ok(listing)
    }

    async fn cached_listing(&self) -> Option<Vec<CountryReference>> {
        let cached = match self.cache.get(COUNTRY_LISTING_KEY).await {
            Ok(cached) => cached?,
            Err(e) => {
                warn!("Country listing cache read failed: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&cached) {
            Ok(listing) => Some(listing),
            Err(e) => {
                warn!("Discarding unreadable cached country listing: {}", e);
                None
            }
        }
    }

    /// Runs a filtered, sorted, paginated query.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the options cannot be translated.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn query_countries(&self, options: &QueryOptions) -> Result<Vec<Country>, AppError> {
        let query = self.translator.translate(options)?;
        debug!(?query, "Translated country query");
        self.repository.find_many(&query).await
    }

    /// Retrieves a country by its business key.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no country has this key.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn get_country(&self, entity_id: &str) -> Result<Country, AppError> {
        self.repository
            .find_by_entity_id(entity_id)
            .await?
            .ok_or_else(|| not_found(entity_id))
    }

    /// Counts every stored country.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn count_countries(&self) -> Result<i64, AppError> {
        self.repository.count().await
    }

    /// Creates a country if its business key is unused.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if a required field is empty.
    /// Returns [`AppError::Conflict`] if the key already exists.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn create_country(&self, new_country: NewCountry) -> Result<Country, AppError> {
        new_country
            .validate()
            .map_err(|e| AppError::invalid_fields(&e))?;

        if self
            .repository
            .find_by_entity_id(&new_country.entity_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(
                "Country already exists",
                json!({ "entityId": new_country.entity_id }),
            ));
        }

        let created = self.repository.insert(new_country).await?;
        self.invalidate_listing().await;

        Ok(created)
    }

    /// Fully replaces the country stored under `entity_id`.
    ///
    /// The storage identity of the existing record is kept.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `entity_id` differs from the body's key
    /// (storage is not touched) or a required field is empty.
    /// Returns [`AppError::NotFound`] if no country has this key.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn replace_country(
        &self,
        entity_id: &str,
        replacement: NewCountry,
    ) -> Result<Country, AppError> {
        if replacement.entity_id != entity_id {
            return Err(AppError::bad_request(
                "Route key does not match body entityId",
                json!({ "route": entity_id, "body": replacement.entity_id }),
            ));
        }

        replacement
            .validate()
            .map_err(|e| AppError::invalid_fields(&e))?;

        let existing = self.get_country(entity_id).await?;
        let replaced = self
            .repository
            .replace(replacement.with_technical_id(existing.technical_id))
            .await?;
        self.invalidate_listing().await;

        Ok(replaced)
    }

    /// Applies a partial update to the country stored under `entity_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no country has this key.
    /// Returns [`AppError::Unprocessable`] if the patched record violates a
    /// required-field rule; the stored record is left unchanged.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn patch_country(
        &self,
        entity_id: &str,
        patch: &CountryPatch,
    ) -> Result<Country, AppError> {
        let existing = self.get_country(entity_id).await?;

        let patched = patch.apply_to(&existing);
        patched
            .validate()
            .map_err(|e| AppError::unprocessable_fields(&e))?;

        let stored = self.repository.replace(patched).await?;
        self.invalidate_listing().await;

        Ok(stored)
    }

    /// Deletes the country stored under `entity_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no country has this key.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn delete_country(&self, entity_id: &str) -> Result<(), AppError> {
        let existing = self.get_country(entity_id).await?;
        self.repository
            .delete(existing.technical_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound { .. } => not_found(entity_id),
                other => other,
            })?;
        self.invalidate_listing().await;

        Ok(())
    }

    /// Storage liveness for health checks.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }

    async fn invalidate_listing(&self) {
        if let Err(e) = self.cache.invalidate(COUNTRY_LISTING_KEY).await {
            warn!("Failed to invalidate country listing cache: {}", e);
        }
    }
}

fn not_found(entity_id: &str) -> AppError {
    AppError::not_found("Country not found", json!({ "entityId": entity_id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::CountryChange;
    use crate::domain::query::{CountryField, Predicate};
    use crate::domain::repositories::MockCountryRepository;
    use crate::infrastructure::cache::{MemoryCache, NullCache};

    fn country(id: i64, entity_id: &str, name: &str, iso_code: &str) -> Country {
        Country::new(
            id,
            entity_id.to_string(),
            name.to_string(),
            iso_code.to_string(),
        )
    }

    fn new_country(entity_id: &str, name: &str, iso_code: &str) -> NewCountry {
        NewCountry {
            entity_id: entity_id.to_string(),
            name: name.to_string(),
            iso_code: iso_code.to_string(),
        }
    }

    fn service(
        repo: MockCountryRepository,
        cache: Arc<dyn CacheService>,
    ) -> CountryService<MockCountryRepository> {
        CountryService::new(Arc::new(repo), cache, DEFAULT_LISTING_TTL)
    }

    #[tokio::test]
    async fn test_listing_is_fetched_once_while_cached() {
        let mut mock_repo = MockCountryRepository::new();
        mock_repo
            .expect_find_many()
            .withf(|query| *query == CountryQuery::sorted_by_name())
            .times(1)
            .returning(|_| Ok(vec![country(2, "at", "Austria", "AT"), country(1, "fr", "France", "FR")]));

        let service = service(mock_repo, Arc::new(MemoryCache::new()));

        let first = service.list_countries().await.unwrap();
        let second = service.list_countries().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].entity_id, "at");
        assert_eq!(first[1].entity_id, "fr");
    }

    #[tokio::test]
    async fn test_create_invalidates_listing() {
        let mut mock_repo = MockCountryRepository::new();
        mock_repo
            .expect_find_many()
            .times(2)
            .returning(|_| Ok(vec![country(1, "fr", "France", "FR")]));
        mock_repo
            .expect_find_by_entity_id()
            .withf(|id| id == "de")
            .times(1)
            .returning(|_| Ok(None));
        mock_repo
            .expect_insert()
            .times(1)
            .returning(|new_country| Ok(new_country.with_technical_id(2)));

        let service = service(mock_repo, Arc::new(MemoryCache::new()));

        service.list_countries().await.unwrap();
        service
            .create_country(new_country("de", "Germany", "DE"))
            .await
            .unwrap();
        service.list_countries().await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_invalidates_listing() {
        let mut mock_repo = MockCountryRepository::new();
        mock_repo
            .expect_find_many()
            .times(2)
            .returning(|_| Ok(vec![]));
        mock_repo
            .expect_find_by_entity_id()
            .returning(|_| Ok(Some(country(1, "fr", "France", "FR"))));
        mock_repo
            .expect_delete()
            .withf(|id| *id == 1)
            .times(1)
            .returning(|_| Ok(()));

        let service = service(mock_repo, Arc::new(MemoryCache::new()));

        service.list_countries().await.unwrap();
        service.delete_country("fr").await.unwrap();
        service.list_countries().await.unwrap();
    }

    #[tokio::test]
    async fn test_replace_invalidates_listing() {
        let mut mock_repo = MockCountryRepository::new();
        mock_repo
            .expect_find_many()
            .times(2)
            .returning(|_| Ok(vec![country(1, "fr", "France", "FR")]));
        mock_repo
            .expect_find_by_entity_id()
            .returning(|_| Ok(Some(country(1, "fr", "France", "FR"))));
        mock_repo
            .expect_replace()
            .times(1)
            .returning(|country| Ok(country));

        let cache = Arc::new(MemoryCache::new());
        let service = service(mock_repo, cache.clone());

        service.list_countries().await.unwrap();
        assert!(cache.get(COUNTRY_LISTING_KEY).await.unwrap().is_some());

        service
            .replace_country("fr", new_country("fr", "République française", "FR"))
            .await
            .unwrap();

        assert!(cache.get(COUNTRY_LISTING_KEY).await.unwrap().is_none());
        service.list_countries().await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_lost_race_reports_route_key() {
        let mut mock_repo = MockCountryRepository::new();
        mock_repo
            .expect_find_by_entity_id()
            .returning(|_| Ok(Some(country(7, "fr", "France", "FR"))));
        mock_repo
            .expect_delete()
            .times(1)
            .returning(|_| Err(AppError::not_found("Country not found", json!({}))));

        let service = service(mock_repo, Arc::new(NullCache::new()));

        match service.delete_country("fr").await {
            Err(AppError::NotFound { details, .. }) => {
                assert_eq!(details, json!({ "entityId": "fr" }));
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_query_uses_translated_query() {
        let mut mock_repo = MockCountryRepository::new();
        mock_repo
            .expect_find_many()
            .withf(|query| {
                query.predicates == vec![Predicate::eq(CountryField::EntityId, "fr")]
                    && query.skip == 1
                    && query.top == Some(0)
            })
            .times(1)
            .returning(|_| Ok(vec![]));

        let service = service(mock_repo, Arc::new(NullCache::new()));

        let options = QueryOptions {
            filter: Some("entityId eq 'fr'".to_string()),
            order_by: None,
            skip: Some(1),
            top: Some(-3),
        };
        let result = service.query_countries(&options).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_query_with_malformed_filter_does_not_touch_storage() {
        let mock_repo = MockCountryRepository::new();
        let service = service(mock_repo, Arc::new(NullCache::new()));

        let options = QueryOptions {
            filter: Some("name eq 'France".to_string()),
            ..QueryOptions::default()
        };

        assert!(matches!(
            service.query_countries(&options).await,
            Err(AppError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_country_not_found() {
        let mut mock_repo = MockCountryRepository::new();
        mock_repo
            .expect_find_by_entity_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(mock_repo, Arc::new(NullCache::new()));

        assert!(matches!(
            service.get_country("zz").await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_duplicate_conflicts_without_insert() {
        let mut mock_repo = MockCountryRepository::new();
        mock_repo
            .expect_find_by_entity_id()
            .times(1)
            .returning(|_| Ok(Some(country(1, "fr", "France", "FR"))));
        mock_repo.expect_insert().never();

        let service = service(mock_repo, Arc::new(NullCache::new()));

        let result = service
            .create_country(new_country("fr", "Other France", "XX"))
            .await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_create_with_empty_name_is_bad_request() {
        let mock_repo = MockCountryRepository::new();
        let service = service(mock_repo, Arc::new(NullCache::new()));

        let result = service.create_country(new_country("fr", "", "FR")).await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_replace_key_mismatch_does_not_touch_storage() {
        let mock_repo = MockCountryRepository::new();
        let service = service(mock_repo, Arc::new(NullCache::new()));

        let result = service
            .replace_country("fr", new_country("de", "Germany", "DE"))
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_replace_preserves_technical_id() {
        let mut mock_repo = MockCountryRepository::new();
        mock_repo
            .expect_find_by_entity_id()
            .times(1)
            .returning(|_| Ok(Some(country(9, "fr", "France", "FR"))));
        mock_repo
            .expect_replace()
            .withf(|c| c.technical_id == 9 && c.name == "French Republic" && c.iso_code == "FRA")
            .times(1)
            .returning(Ok);

        let service = service(mock_repo, Arc::new(NullCache::new()));

        let replaced = service
            .replace_country("fr", new_country("fr", "French Republic", "FRA"))
            .await
            .unwrap();

        assert_eq!(replaced.technical_id, 9);
    }

    #[tokio::test]
    async fn test_replace_missing_is_not_found() {
        let mut mock_repo = MockCountryRepository::new();
        mock_repo
            .expect_find_by_entity_id()
            .times(1)
            .returning(|_| Ok(None));
        mock_repo.expect_replace().never();

        let service = service(mock_repo, Arc::new(NullCache::new()));

        let result = service
            .replace_country("fr", new_country("fr", "France", "FR"))
            .await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_patch_applies_changes() {
        let mut mock_repo = MockCountryRepository::new();
        mock_repo
            .expect_find_by_entity_id()
            .times(1)
            .returning(|_| Ok(Some(country(3, "fr", "France", "FR"))));
        mock_repo
            .expect_replace()
            .withf(|c| c.technical_id == 3 && c.name == "France" && c.iso_code == "FRA")
            .times(1)
            .returning(Ok);

        let service = service(mock_repo, Arc::new(NullCache::new()));
        let patch = CountryPatch::new(vec![CountryChange::SetIsoCode("FRA".to_string())]);

        let patched = service.patch_country("fr", &patch).await.unwrap();

        assert_eq!(patched.iso_code, "FRA");
    }

    #[tokio::test]
    async fn test_patch_to_empty_name_is_unprocessable_and_not_stored() {
        let mut mock_repo = MockCountryRepository::new();
        mock_repo
            .expect_find_by_entity_id()
            .times(1)
            .returning(|_| Ok(Some(country(3, "fr", "France", "FR"))));
        mock_repo.expect_replace().never();

        let service = service(mock_repo, Arc::new(NullCache::new()));
        let patch = CountryPatch::new(vec![CountryChange::SetName(String::new())]);

        let result = service.patch_country("fr", &patch).await;

        match result {
            Err(AppError::Unprocessable { details, .. }) => {
                assert_eq!(details["fields"], json!(["name"]));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let mut mock_repo = MockCountryRepository::new();
        mock_repo
            .expect_find_by_entity_id()
            .times(1)
            .returning(|_| Ok(None));
        mock_repo.expect_delete().never();

        let service = service(mock_repo, Arc::new(NullCache::new()));

        assert!(matches!(
            service.delete_country("zz").await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_count() {
        let mut mock_repo = MockCountryRepository::new();
        mock_repo.expect_count().times(1).returning(|| Ok(42));

        let service = service(mock_repo, Arc::new(NullCache::new()));

        assert_eq!(service.count_countries().await.unwrap(), 42);
    }
}
