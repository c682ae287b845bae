// SPDX-License-Identifier: AGPL-3.0-or-later

//! Account registration and session issuance.

use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    auth::{password, tokens},
    config::{ALLOWED_EMAIL_SUFFIX, REFRESH_TOKEN_TTL_SECS},
    error::ApiError,
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserSummary {
    pub username: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

fn hashing_failure(err: bcrypt::BcryptError) -> ApiError {
    tracing::error!(error = %err, "Password hashing failed");
    ApiError::internal("Internal server error")
}

/// Register a new account.
///
/// No session is issued; the caller logs in afterwards.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Account created", body = MessageResponse),
        (status = 400, description = "Invalid email or username/email already taken"),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = request.email.trim();
    if email.is_empty() || !email.to_ascii_lowercase().ends_with(ALLOWED_EMAIL_SUFFIX) {
        return Err(ApiError::bad_request(format!(
            "Email must end with {ALLOWED_EMAIL_SUFFIX}"
        )));
    }

    let password_hash = password::hash_password(&request.password).map_err(hashing_failure)?;
    let user = state
        .db
        .create_user(&request.username, email, &password_hash)?;

    tracing::info!(user_id = %user.id, username = %user.username, "Account registered");
    Ok(Json(MessageResponse {
        message: "User registered successfully".to_string(),
    }))
}

/// Exchange credentials for an access/refresh token pair.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Session issued", body = LoginResponse),
        (status = 401, description = "Unknown username or wrong password"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state.db.find_user_by_username(&request.username)?;
    // Identical response for unknown username and wrong password.
    let user = match user {
        Some(user) => user,
        None => return Err(ApiError::unauthorized("Invalid credentials")),
    };
    let verified = password::verify_password(&request.password, &user.password_hash)
        .map_err(|err| {
            tracing::error!(error = %err, "Password verification failed");
            ApiError::internal("Internal server error")
        })?;
    if !verified {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let access_token = tokens::issue_access_token(&state.auth, &user.id, &user.username, &user.email)
        .map_err(|err| {
            tracing::error!(error = %err, "Access token signing failed");
            ApiError::internal("Internal server error")
        })?;
    let refresh_token = tokens::new_refresh_token();
    let expires_at = Utc::now() + Duration::seconds(REFRESH_TOKEN_TTL_SECS);
    state
        .db
        .store_refresh_token(&user.id, &refresh_token, expires_at)?;

    tracing::info!(user_id = %user.id, "Login succeeded");
    Ok(Json(LoginResponse {
        access_token,
        refresh_token,
        user: UserSummary {
            username: user.username,
        },
    }))
}

/// Exchange a refresh token for a fresh access/refresh pair.
///
/// The presented token is invalidated in the same transaction that stores
/// its replacement, so a replay of the old token always fails.
#[utoipa::path(
    post,
    path = "/api/token/refresh",
    request_body = RefreshRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Session rotated", body = TokenPairResponse),
        (status = 401, description = "Refresh token unknown or expired"),
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    let new_refresh = tokens::new_refresh_token();
    let expires_at = Utc::now() + Duration::seconds(REFRESH_TOKEN_TTL_SECS);

    let user = state
        .db
        .rotate_refresh_token(&request.refresh_token, &new_refresh, expires_at)?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired refresh token"))?;

    let access_token = tokens::issue_access_token(&state.auth, &user.id, &user.username, &user.email)
        .map_err(|err| {
            tracing::error!(error = %err, "Access token signing failed");
            ApiError::internal("Internal server error")
        })?;

    Ok(Json(TokenPairResponse {
        access_token,
        refresh_token: new_refresh,
    }))
}
