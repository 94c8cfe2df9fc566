//! Authentication service for API token validation.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::repositories::{ApiToken, TokenRepository};
use crate::error::AppError;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// Hashes a raw token with HMAC-SHA256 keyed by `signing_secret`.
///
/// Returns a 64-character lowercase hex-encoded MAC. The admin CLI and the
/// server must use the same secret for tokens to verify.
pub fn hash_token(signing_secret: &str, token: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Generates a random 48-character alphanumeric token.
pub fn generate_token() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    const TOKEN_LEN: usize = 48;

    let mut rng = rand::rng();

    (0..TOKEN_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// Service for authenticating API requests via Bearer tokens.
///
/// Tokens are hashed with HMAC-SHA256 (keyed by `signing_secret`) before storage
/// and comparison, so a database dump alone cannot be used to forge tokens.
pub struct AuthService<R: TokenRepository + ?Sized> {
    repository: Arc<R>,
    signing_secret: String,
}

impl<R: TokenRepository + ?Sized> AuthService<R> {
    /// Creates a new authentication service.
    ///
    /// `signing_secret` must match the value used when tokens were created.
    pub fn new(repository: Arc<R>, signing_secret: String) -> Self {
        Self {
            repository,
            signing_secret,
        }
    }

    pub fn hash_token(&self, token: &str) -> String {
        hash_token(&self.signing_secret, token)
    }

    /// Resolves a raw token to its stored record.
    ///
    /// On success the token's `last_used_at` is refreshed; failures to do so
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is unknown or revoked.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn authenticate(&self, token: &str) -> Result<ApiToken, AppError> {
        let token_hash = self.hash_token(token);

        let Some(api_token) = self.repository.find_active(&token_hash).await? else {
            return Err(AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Invalid or revoked token"}),
            ));
        };

        let _ = self.repository.update_last_used(&token_hash).await;

        Ok(api_token)
    }

    /// Stores a new token and returns its record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the name or token is already registered.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn register_token(
        &self,
        name: &str,
        token: &str,
        is_editor: bool,
    ) -> Result<ApiToken, AppError> {
        let token_hash = self.hash_token(token);
        self.repository
            .create_token(name, &token_hash, is_editor)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockTokenRepository;
    use chrono::Utc;

    fn test_secret() -> String {
        "test-signing-secret".to_string()
    }

    fn api_token(hash: &str, is_editor: bool) -> ApiToken {
        ApiToken {
            id: 1,
            name: "ci".to_string(),
            token_hash: hash.to_string(),
            is_editor,
            created_at: Utc::now(),
            revoked_at: None,
        }
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let mut mock_repo = MockTokenRepository::new();

        let token = "valid-token";
        let expected_hash = hash_token(&test_secret(), token);
        let stored = api_token(&expected_hash, true);

        mock_repo
            .expect_find_active()
            .withf(move |hash| hash == expected_hash)
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));

        mock_repo
            .expect_update_last_used()
            .times(1)
            .returning(|_| Ok(()));

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        let result = service.authenticate(token).await.unwrap();

        assert!(result.is_editor);
        assert_eq!(result.name, "ci");
    }

    #[tokio::test]
    async fn test_authenticate_invalid_token() {
        let mut mock_repo = MockTokenRepository::new();

        mock_repo
            .expect_find_active()
            .times(1)
            .returning(|_| Ok(None));
        mock_repo.expect_update_last_used().never();

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        let result = service.authenticate("invalid-token").await;

        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_last_used_failure_is_ignored() {
        let mut mock_repo = MockTokenRepository::new();

        mock_repo
            .expect_find_active()
            .returning(|hash| Ok(Some(api_token(hash, false))));
        mock_repo
            .expect_update_last_used()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        assert!(service.authenticate("token").await.is_ok());
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_token() {
        let mut mock_repo = MockTokenRepository::new();
        let expected_hash = hash_token(&test_secret(), "raw-token");

        mock_repo
            .expect_create_token()
            .withf(move |name, hash, is_editor| {
                name == "ci" && hash == expected_hash && *is_editor
            })
            .times(1)
            .returning(|_, hash, is_editor| Ok(api_token(hash, is_editor)));

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        let created = service.register_token("ci", "raw-token", true).await.unwrap();

        assert_ne!(created.token_hash, "raw-token");
    }

    #[tokio::test]
    async fn test_registered_token_authenticates() {
        use crate::infrastructure::persistence::MemoryTokenRepository;

        let service = AuthService::new(Arc::new(MemoryTokenRepository::new()), test_secret());

        service
            .register_token("bootstrap-editor", "raw-token", true)
            .await
            .unwrap();

        let caller = service.authenticate("raw-token").await.unwrap();
        assert_eq!(caller.name, "bootstrap-editor");
        assert!(caller.is_editor);
        assert!(service.authenticate("other-token").await.is_err());
    }

    #[test]
    fn test_hash_token_consistency() {
        let hash1 = hash_token(&test_secret(), "test-token");
        let hash2 = hash_token(&test_secret(), "test-token");

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_hash_token_secret_matters() {
        assert_ne!(hash_token("secret-a", "token"), hash_token("secret-b", "token"));
        assert_ne!(hash_token("secret", "token1"), hash_token("secret", "token2"));
    }

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token();

        assert_eq!(token.len(), 48);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, generate_token());
    }
}
