//! Authentication extractors.
//!
//! Route handlers opt into protection by taking one of these extractors.
//! Each one verifies the bearer token, loads the account from the
//! database, and for the role-gated variants checks the capability the
//! route needs. A missing or bad token is `401`; a valid token with the
//! wrong role is `403`.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use carniceria_core::Capability;

use crate::db::UserRepository;
use crate::models::User;
use crate::services::auth::TokenService;
use crate::state::AppState;

/// Extractor that requires a valid session token.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(RequireAuth(user): RequireAuth) -> Json<User> {
///     Json(user)
/// }
/// ```
pub struct RequireAuth(pub User);

/// Extractor that requires the catalog-management capability
/// (admin or editor).
pub struct RequireCatalogWrite(pub User);

/// Extractor that requires the user-management capability (admin only).
pub struct RequireAdmin(pub User);

/// Rejection for the auth extractors.
pub enum AuthRejection {
    /// Missing, malformed, expired, or otherwise invalid token.
    Unauthorized(String),
    /// Valid token, insufficient role.
    Forbidden,
    /// Account lookup failed.
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "insufficient role for this operation".to_owned(),
            ),
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
            ),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Verify the bearer token and load the account it names.
async fn authenticate(parts: &Parts, state: &AppState) -> Result<User, AuthRejection> {
    let header_value = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AuthRejection::Unauthorized("missing authorization header".to_owned()))?;

    let token = TokenService::extract_bearer(header_value)
        .ok_or_else(|| AuthRejection::Unauthorized("expected a bearer token".to_owned()))?;

    let claims = state
        .tokens()
        .verify(token)
        .map_err(|e| AuthRejection::Unauthorized(e.to_string()))?;

    let user_id = claims
        .user_id()
        .map_err(|e| AuthRejection::Unauthorized(e.to_string()))?;

    // The account is reloaded on every request so role changes and
    // deletions take effect before the token expires.
    let user = UserRepository::new(state.pool())
        .get_by_id(user_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to load user during auth");
            AuthRejection::Internal
        })?
        .ok_or_else(|| AuthRejection::Unauthorized("account no longer exists".to_owned()))?;

    Ok(user)
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state).await?;
        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for RequireCatalogWrite {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state).await?;

        if !user.role.allows(Capability::ManageCatalog) {
            return Err(AuthRejection::Forbidden);
        }

        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state).await?;

        if !user.role.allows(Capability::ManageUsers) {
            return Err(AuthRejection::Forbidden);
        }

        Ok(Self(user))
    }
}
