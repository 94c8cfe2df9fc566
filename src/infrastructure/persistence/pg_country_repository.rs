//! PostgreSQL implementation of the country repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::sync::Arc;

use crate::domain::entities::{Country, NewCountry};
use crate::domain::query::{CountryField, CountryQuery, SortDirection};
use crate::domain::repositories::CountryRepository;
use crate::error::AppError;

const SELECT_COUNTRY: &str = "SELECT technical_id, entity_id, name, iso_code FROM countries";

#[derive(Debug, FromRow)]
struct CountryRow {
    technical_id: i64,
    entity_id: String,
    name: String,
    iso_code: String,
}

impl From<CountryRow> for Country {
    fn from(row: CountryRow) -> Self {
        Country::new(row.technical_id, row.entity_id, row.name, row.iso_code)
    }
}

fn column(field: CountryField) -> &'static str {
    match field {
        CountryField::Name => "name",
        CountryField::IsoCode => "iso_code",
        CountryField::EntityId => "entity_id",
    }
}

/// Appends WHERE / ORDER BY / OFFSET / LIMIT for `query` to `builder`.
///
/// Only known sort fields reach SQL; text is compared bytewise (`COLLATE "C"`)
/// and `technical_id` breaks remaining ties, matching in-memory evaluation.
fn push_query_clauses(builder: &mut QueryBuilder<'_, Postgres>, query: &CountryQuery) {
    for (i, predicate) in query.predicates.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        builder.push(column(predicate.field));
        builder.push(" = ");
        builder.push_bind(predicate.value.clone());
    }

    builder.push(" ORDER BY ");
    for key in &query.sort {
        let Some(field) = key.known_field() else {
            continue;
        };
        let direction = match key.direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        builder.push(format!("{} COLLATE \"C\" {}, ", column(field), direction));
    }
    builder.push("technical_id ASC");

    builder.push(" OFFSET ");
    builder.push_bind(i64::try_from(query.skip).unwrap_or(i64::MAX));

    if let Some(top) = query.top {
        builder.push(" LIMIT ");
        builder.push_bind(i64::try_from(top).unwrap_or(i64::MAX));
    }
}

/// PostgreSQL repository for the `countries` table.
///
/// `entity_id` carries a unique index as a backstop to the service-level
/// existence check; a violation surfaces as [`AppError::Conflict`].
pub struct PgCountryRepository {
    pool: Arc<PgPool>,
}

impl PgCountryRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CountryRepository for PgCountryRepository {
    async fn find_by_entity_id(&self, entity_id: &str) -> Result<Option<Country>, AppError> {
        let row = sqlx::query_as::<_, CountryRow>(
            r#"
            SELECT technical_id, entity_id, name, iso_code
            FROM countries
            WHERE entity_id = $1
            "#,
        )
        .bind(entity_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Country::from))
    }

    async fn find_many(&self, query: &CountryQuery) -> Result<Vec<Country>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_COUNTRY);
        push_query_clauses(&mut builder, query);

        let rows = builder
            .build_query_as::<CountryRow>()
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Country::from).collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM countries")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn insert(&self, new_country: NewCountry) -> Result<Country, AppError> {
        let row = sqlx::query_as::<_, CountryRow>(
            r#"
            INSERT INTO countries (entity_id, name, iso_code)
            VALUES ($1, $2, $3)
            RETURNING technical_id, entity_id, name, iso_code
            "#,
        )
        .bind(&new_country.entity_id)
        .bind(&new_country.name)
        .bind(&new_country.iso_code)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn replace(&self, country: Country) -> Result<Country, AppError> {
        let row = sqlx::query_as::<_, CountryRow>(
            r#"
            UPDATE countries SET
                entity_id = $2,
                name      = $3,
                iso_code  = $4
            WHERE technical_id = $1
            RETURNING technical_id, entity_id, name, iso_code
            "#,
        )
        .bind(country.technical_id)
        .bind(&country.entity_id)
        .bind(&country.name)
        .bind(&country.iso_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Country::from).ok_or_else(|| {
            AppError::not_found(
                "Country not found",
                json!({ "entityId": country.entity_id }),
            )
        })
    }

    async fn delete(&self, technical_id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM countries WHERE technical_id = $1")
            .bind(technical_id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Country not found", json!({})));
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
