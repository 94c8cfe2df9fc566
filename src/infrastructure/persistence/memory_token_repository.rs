//! In-process implementation of the token repository.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tokio::sync::RwLock;

use crate::domain::repositories::{ApiToken, TokenRepository};
use crate::error::AppError;

/// Token store held in process memory.
///
/// Pairs with [`super::MemoryCountryRepository`] for local runs and tests.
#[derive(Default)]
pub struct MemoryTokenRepository {
    tokens: RwLock<Vec<ApiToken>>,
}

impl MemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenRepository for MemoryTokenRepository {
    async fn find_active(&self, token_hash: &str) -> Result<Option<ApiToken>, AppError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .iter()
            .find(|t| t.token_hash == token_hash && t.revoked_at.is_none())
            .cloned())
    }

    async fn update_last_used(&self, _token_hash: &str) -> Result<(), AppError> {
        Ok(())
    }

    async fn create_token(
        &self,
        name: &str,
        token_hash: &str,
        is_editor: bool,
    ) -> Result<ApiToken, AppError> {
        let mut tokens = self.tokens.write().await;

        if tokens
            .iter()
            .any(|t| t.name == name || t.token_hash == token_hash)
        {
            return Err(AppError::conflict(
                "Token already exists",
                json!({ "name": name }),
            ));
        }

        let token = ApiToken {
            id: tokens.len() as i64 + 1,
            name: name.to_string(),
            token_hash: token_hash.to_string(),
            is_editor,
            created_at: Utc::now(),
            revoked_at: None,
        };
        tokens.push(token.clone());

        Ok(token)
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.iter().rev().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, AppError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.iter().find(|t| t.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.iter().find(|t| t.name == name).cloned())
    }

    async fn revoke_token(&self, id: i64) -> Result<(), AppError> {
        let mut tokens = self.tokens.write().await;
        if let Some(token) = tokens
            .iter_mut()
            .find(|t| t.id == id && t.revoked_at.is_none())
        {
            token.revoked_at = Some(Utc::now());
        }
        Ok(())
    }
}
