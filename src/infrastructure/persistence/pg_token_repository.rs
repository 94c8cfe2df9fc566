//! PostgreSQL implementation of token repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::repositories::{ApiToken, TokenRepository};
use crate::error::AppError;

#[derive(Debug, FromRow)]
struct TokenRow {
    id: i64,
    name: String,
    token_hash: String,
    is_editor: bool,
    created_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
}

impl From<TokenRow> for ApiToken {
    fn from(row: TokenRow) -> Self {
        ApiToken {
            id: row.id,
            name: row.name,
            token_hash: row.token_hash,
            is_editor: row.is_editor,
            created_at: row.created_at,
            revoked_at: row.revoked_at,
        }
    }
}

/// PostgreSQL repository for API token storage and validation.
///
/// Stores hashed tokens only. Raw tokens are never persisted.
pub struct PgTokenRepository {
    pool: Arc<PgPool>,
}

impl PgTokenRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn find_active(&self, token_hash: &str) -> Result<Option<ApiToken>, AppError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT id, name, token_hash, is_editor, created_at, revoked_at
            FROM api_tokens
            WHERE token_hash = $1
              AND revoked_at IS NULL
            "#,
        )
        .bind(token_hash)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(ApiToken::from))
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE api_tokens
            SET last_used_at = NOW()
            WHERE token_hash = $1
              AND revoked_at IS NULL
            "#,
        )
        .bind(token_hash)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn create_token(
        &self,
        name: &str,
        token_hash: &str,
        is_editor: bool,
    ) -> Result<ApiToken, AppError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            INSERT INTO api_tokens (name, token_hash, is_editor)
            VALUES ($1, $2, $3)
            RETURNING id, name, token_hash, is_editor, created_at, revoked_at
            "#,
        )
        .bind(name)
        .bind(token_hash)
        .bind(is_editor)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        let rows = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT id, name, token_hash, is_editor, created_at, revoked_at
            FROM api_tokens
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(ApiToken::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, AppError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT id, name, token_hash, is_editor, created_at, revoked_at
            FROM api_tokens
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(ApiToken::from))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT id, name, token_hash, is_editor, created_at, revoked_at
            FROM api_tokens
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(ApiToken::from))
    }

    async fn revoke_token(&self, id: i64) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE api_tokens
            SET revoked_at = NOW()
            WHERE id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}
