//! Repository trait for country storage.

use crate::domain::entities::{Country, NewCountry};
use crate::domain::query::CountryQuery;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the country collection.
///
/// The store is keyed by a storage-assigned `technical_id`; the business key
/// `entity_id` is looked up with an equality match.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgCountryRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryCountryRepository`] - In-process store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CountryRepository: Send + Sync {
    /// Finds a country by its business key.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_entity_id(&self, entity_id: &str) -> Result<Option<Country>, AppError>;

    /// Runs a filtered, sorted, paginated scan.
    ///
    /// Records that tie on every sort key come back in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_many(&self, query: &CountryQuery) -> Result<Vec<Country>, AppError>;

    /// Counts every stored country.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn count(&self) -> Result<i64, AppError>;

    /// Inserts a new country and returns it with its assigned `technical_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the store rejects a duplicate `entity_id`.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn insert(&self, new_country: NewCountry) -> Result<Country, AppError>;

    /// Replaces the record identified by `country.technical_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record has that `technical_id`.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn replace(&self, country: Country) -> Result<Country, AppError>;

    /// Removes the record identified by `technical_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record has that `technical_id`.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn delete(&self, technical_id: i64) -> Result<(), AppError>;

    /// Cheap liveness probe for health checks.
    async fn ping(&self) -> Result<(), AppError> {
        self.count().await.map(|_| ())
    }
}
