//! Repository trait for API token authentication.

use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// API token entity with metadata.
///
/// Tokens are stored as HMAC-SHA256 hashes. `is_editor` grants the editor
/// capability required by mutating and bulk-query endpoints.
#[derive(Debug, Clone)]
pub struct ApiToken {
    pub id: i64,
    pub name: String,
    pub token_hash: String,
    pub is_editor: bool,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Repository interface for API token management.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTokenRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryTokenRepository`] - In-process store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Looks up a non-revoked token by hash.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_active(&self, token_hash: &str) -> Result<Option<ApiToken>, AppError>;

    /// Updates the last_used timestamp for a token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError>;

    /// Creates a new API token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if a token with the same name or hash already exists.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn create_token(
        &self,
        name: &str,
        token_hash: &str,
        is_editor: bool,
    ) -> Result<ApiToken, AppError>;

    /// Lists all tokens, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError>;

    /// Finds a token by its database ID.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, AppError>;

    /// Finds a token by its name.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError>;

    /// Revokes a token, preventing further authentication.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn revoke_token(&self, id: i64) -> Result<(), AppError>;
}
