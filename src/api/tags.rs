// SPDX-License-Identifier: AGPL-3.0-or-later

//! Global tag catalog endpoints.
//!
//! Tags are shared across accounts: authenticated callers all see and
//! manage the same catalog. Only the todo↔tag associations are
//! owner-scoped, and those live with the todo endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    api::auth::MessageResponse,
    auth::Auth,
    error::ApiError,
    state::AppState,
    storage::StoredTag,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct TagRequest {
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TagResponse {
    pub id: String,
    pub name: String,
}

impl From<StoredTag> for TagResponse {
    fn from(tag: StoredTag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TagEnvelope {
    pub message: String,
    pub tag: TagResponse,
}

/// The full tag catalog.
#[utoipa::path(
    get,
    path = "/api/tags",
    tag = "Tags",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All tags", body = [TagResponse]),
        (status = 401, description = "Missing or invalid token"),
    )
)]
pub async fn get_tags(
    Auth(_identity): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<TagResponse>>, ApiError> {
    let tags = state.db.list_tags()?;
    Ok(Json(tags.into_iter().map(Into::into).collect()))
}

/// Create a tag with a unique, non-empty name.
#[utoipa::path(
    post,
    path = "/api/tags",
    request_body = TagRequest,
    tag = "Tags",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Tag created", body = TagEnvelope),
        (status = 400, description = "Empty or duplicate name"),
        (status = 401, description = "Missing or invalid token"),
    )
)]
pub async fn create_tag(
    Auth(_identity): Auth,
    State(state): State<AppState>,
    Json(request): Json<TagRequest>,
) -> Result<Json<TagEnvelope>, ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Tag name is required"));
    }

    let tag = state.db.create_tag(&request.name)?;
    Ok(Json(TagEnvelope {
        message: "Tag created successfully".to_string(),
        tag: tag.into(),
    }))
}

/// Rename a tag.
#[utoipa::path(
    put,
    path = "/api/tags/{id}",
    params(("id" = String, Path, description = "Tag identifier")),
    request_body = TagRequest,
    tag = "Tags",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Tag renamed", body = TagEnvelope),
        (status = 400, description = "Name already used by another tag"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Tag does not exist"),
    )
)]
pub async fn update_tag(
    Auth(_identity): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<TagRequest>,
) -> Result<Json<TagEnvelope>, ApiError> {
    let tag = state.db.rename_tag(&id, &request.name)?;
    Ok(Json(TagEnvelope {
        message: "Tag updated successfully".to_string(),
        tag: tag.into(),
    }))
}

/// Delete a tag and every association referencing it.
#[utoipa::path(
    delete,
    path = "/api/tags/{id}",
    params(("id" = String, Path, description = "Tag identifier")),
    tag = "Tags",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Tag and its associations deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Tag does not exist"),
    )
)]
pub async fn delete_tag(
    Auth(_identity): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.db.delete_tag(&id)?;
    Ok(Json(MessageResponse {
        message: "Tag deleted successfully".to_string(),
    }))
}
