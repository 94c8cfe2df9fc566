//! In-process implementation of the country repository.

use async_trait::async_trait;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::domain::entities::{Country, NewCountry};
use crate::domain::query::CountryQuery;
use crate::domain::repositories::CountryRepository;
use crate::error::AppError;

#[derive(Default)]
struct Store {
    next_id: i64,
    rows: BTreeMap<i64, Country>,
}

/// Country store held in process memory.
///
/// Used for local runs (`STORAGE_BACKEND=memory`) and HTTP tests. Rows are
/// keyed by `technical_id`, so iteration order is insertion order, which is
/// the tie-breaker [`CountryQuery::apply`] expects.
#[derive(Default)]
pub struct MemoryCountryRepository {
    store: RwLock<Store>,
    scans: AtomicUsize,
}

impl MemoryCountryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of [`CountryRepository::find_many`] calls served so far.
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CountryRepository for MemoryCountryRepository {
    async fn find_by_entity_id(&self, entity_id: &str) -> Result<Option<Country>, AppError> {
        let store = self.store.read().await;
        Ok(store
            .rows
            .values()
            .find(|c| c.entity_id == entity_id)
            .cloned())
    }

    async fn find_many(&self, query: &CountryQuery) -> Result<Vec<Country>, AppError> {
        self.scans.fetch_add(1, Ordering::Relaxed);
        let store = self.store.read().await;
        Ok(query.apply(store.rows.values().cloned()))
    }

    async fn count(&self) -> Result<i64, AppError> {
        let store = self.store.read().await;
        Ok(store.rows.len() as i64)
    }

    async fn insert(&self, new_country: NewCountry) -> Result<Country, AppError> {
        let mut store = self.store.write().await;

        if store
            .rows
            .values()
            .any(|c| c.entity_id == new_country.entity_id)
        {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "countries_entity_id_key" }),
            ));
        }

        store.next_id += 1;
        let country = new_country.with_technical_id(store.next_id);
        store.rows.insert(country.technical_id, country.clone());

        Ok(country)
    }

    async fn replace(&self, country: Country) -> Result<Country, AppError> {
        let mut store = self.store.write().await;

        match store.rows.get_mut(&country.technical_id) {
            Some(existing) => {
                *existing = country.clone();
                Ok(country)
            }
            None => Err(AppError::not_found(
                "Country not found",
                json!({ "entityId": country.entity_id }),
            )),
        }
    }

    async fn delete(&self, technical_id: i64) -> Result<(), AppError> {
        let mut store = self.store.write().await;

        store
            .rows
            .remove(&technical_id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("Country not found", json!({})))
    }
}
