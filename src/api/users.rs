// SPDX-License-Identifier: AGPL-3.0-or-later

//! Self-service account management.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    api::auth::MessageResponse,
    auth::{password, Auth},
    config::ALLOWED_EMAIL_SUFFIX,
    error::ApiError,
    state::AppState,
    storage::StoredUser,
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StoredUser> for ProfileResponse {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileSummary {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateProfileResponse {
    pub message: String,
    pub user: ProfileSummary,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Fetch the calling account's profile.
#[utoipa::path(
    get,
    path = "/api/users/profile",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Account profile", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Account no longer exists"),
    )
)]
pub async fn get_profile(
    Auth(identity): Auth,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = state
        .db
        .get_user(&identity.user_id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user.into()))
}

/// Change the calling account's email address.
#[utoipa::path(
    put,
    path = "/api/users/profile",
    request_body = UpdateProfileRequest,
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile updated", body = UpdateProfileResponse),
        (status = 400, description = "Invalid email or email already in use"),
        (status = 401, description = "Missing or invalid token"),
    )
)]
pub async fn update_profile(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UpdateProfileResponse>, ApiError> {
    let email = request.email.trim();
    if email.is_empty() || !email.to_ascii_lowercase().ends_with(ALLOWED_EMAIL_SUFFIX) {
        return Err(ApiError::bad_request(format!(
            "Email must end with {ALLOWED_EMAIL_SUFFIX}"
        )));
    }

    let user = state.db.update_user_email(&identity.user_id, email)?;
    Ok(Json(UpdateProfileResponse {
        message: "Profile updated successfully".to_string(),
        user: ProfileSummary {
            username: user.username,
            email: user.email,
        },
    }))
}

/// Change the calling account's password.
///
/// The current password must verify against the stored hash first.
#[utoipa::path(
    put,
    path = "/api/users/password",
    request_body = ChangePasswordRequest,
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 401, description = "Current password is wrong or token invalid"),
    )
)]
pub async fn change_password(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = state
        .db
        .get_user(&identity.user_id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let verified = password::verify_password(&request.current_password, &user.password_hash)
        .map_err(|err| {
            tracing::error!(error = %err, "Password verification failed");
            ApiError::internal("Internal server error")
        })?;
    if !verified {
        return Err(ApiError::unauthorized("Current password is incorrect"));
    }

    let new_hash = password::hash_password(&request.new_password).map_err(|err| {
        tracing::error!(error = %err, "Password hashing failed");
        ApiError::internal("Internal server error")
    })?;
    state
        .db
        .update_user_password_hash(&identity.user_id, &new_hash)?;

    tracing::info!(user_id = %identity.user_id, "Password changed");
    Ok(Json(MessageResponse {
        message: "Password changed successfully".to_string(),
    }))
}
