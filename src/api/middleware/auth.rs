//! Bearer token authentication middleware and caller extractors.
//!
//! [`layer`] runs on every country route. It never rejects anonymous
//! requests: it resolves the presented token (if any) into a [`Caller`]
//! request extension. Handlers then decide what they need:
//!
//! - take [`Caller`] to read the identity, anonymous included
//! - take [`RequireEditor`] to demand the editor capability

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;
use tracing::debug;

use crate::domain::repositories::ApiToken;
use crate::{error::AppError, state::AppState};

/// Identity attached to a request by [`layer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Caller {
    #[default]
    Anonymous,
    Token {
        id: i64,
        name: String,
        is_editor: bool,
    },
}

impl Caller {
    pub fn is_editor(&self) -> bool {
        matches!(self, Caller::Token { is_editor: true, .. })
    }

    /// Checks the editor capability.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for anonymous callers and
    /// [`AppError::Forbidden`] for tokens without the capability.
    pub fn require_editor(&self) -> Result<(), AppError> {
        match self {
            Caller::Anonymous => Err(AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Authorization header is missing"}),
            )),
            Caller::Token {
                is_editor: false,
                name,
                ..
            } => Err(AppError::forbidden(
                "Forbidden",
                json!({"reason": "Token lacks the editor capability", "token": name}),
            )),
            Caller::Token { .. } => Ok(()),
        }
    }
}

impl From<ApiToken> for Caller {
    fn from(token: ApiToken) -> Self {
        Caller::Token {
            id: token.id,
            name: token.name,
            is_editor: token.is_editor,
        }
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Caller>().cloned().unwrap_or_default())
    }
}

/// Extractor that only succeeds for callers holding the editor capability.
///
/// ```rust,ignore
/// async fn handler(RequireEditor(caller): RequireEditor) -> impl IntoResponse {
///     // caller is a Caller::Token with is_editor == true
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireEditor(pub Caller);

impl<S> FromRequestParts<S> for RequireEditor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let caller = Caller::from_request_parts(parts, state).await?;
        caller.require_editor()?;
        Ok(RequireEditor(caller))
    }
}

/// Resolves the `Authorization: Bearer <token>` header into a [`Caller`].
///
/// # Errors
///
/// Returns `401 Unauthorized` (with `WWW-Authenticate: Bearer`) when the
/// header is present but malformed, or the token is unknown or revoked.
/// Requests without the header pass through as [`Caller::Anonymous`].
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let caller = if parts.headers.contains_key(AUTHORIZATION) {
        let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
            .await
            .map_err(|_| {
                AppError::unauthorized(
                    "Unauthorized",
                    json!({"reason": "Authorization header is invalid"}),
                )
            })?;

        let api_token = st.auth_service.authenticate(&token).await?;
        debug!(token = %api_token.name, editor = api_token.is_editor, "Authenticated caller");
        Caller::from(api_token)
    } else {
        Caller::Anonymous
    };

    parts.extensions.insert(caller);

    Ok(next.run(Request::from_parts(parts, body)).await)
}
