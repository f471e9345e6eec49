//! Account route handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use carniceria_core::{Email, Role, UserId};

use crate::error::{AppError, FieldError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to `editor`; only an admin reaches this endpoint anyway.
    pub role: Option<Role>,
}

/// `POST /api/users/login` - authenticate and receive a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let user = AuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await?;

    let token = state
        .tokens()
        .issue(user.id, user.role)
        .map_err(|e| AppError::Internal(format!("failed to issue token: {e}")))?;

    Ok(Json(LoginResponse {
        token,
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
    }))
}

/// `POST /api/users/register` - create a staff account (admin only).
pub async fn register(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation(vec![FieldError::missing("name")]));
    }

    let user = AuthService::new(state.pool())
        .register(
            name,
            &body.email,
            &body.password,
            body.role.unwrap_or(Role::Editor),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /api/users/profile` - the authenticated account, password
/// excluded.
pub async fn profile(RequireAuth(user): RequireAuth) -> Json<User> {
    Json(user)
}
