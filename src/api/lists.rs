// SPDX-License-Identifier: AGPL-3.0-or-later

//! List endpoints, owner-scoped.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    api::auth::MessageResponse,
    auth::Auth,
    error::ApiError,
    state::AppState,
    storage::StoredList,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListRequest {
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<StoredList> for ListResponse {
    fn from(list: StoredList) -> Self {
        Self {
            id: list.id,
            name: list.name,
            created_at: list.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListEnvelope {
    pub message: String,
    pub list: ListResponse,
}

/// All lists owned by the calling account.
#[utoipa::path(
    get,
    path = "/api/todos/lists",
    tag = "Lists",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller's lists", body = [ListResponse]),
        (status = 401, description = "Missing or invalid token"),
    )
)]
pub async fn get_lists(
    Auth(identity): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<ListResponse>>, ApiError> {
    let lists = state.db.lists_for_owner(&identity.user_id)?;
    Ok(Json(lists.into_iter().map(Into::into).collect()))
}

/// Create a list owned by the calling account.
#[utoipa::path(
    post,
    path = "/api/todos/lists",
    request_body = ListRequest,
    tag = "Lists",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "List created", body = ListEnvelope),
        (status = 401, description = "Missing or invalid token"),
    )
)]
pub async fn create_list(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Json(request): Json<ListRequest>,
) -> Result<Json<ListEnvelope>, ApiError> {
    let list = state.db.create_list(&identity.user_id, &request.name)?;
    Ok(Json(ListEnvelope {
        message: "List created successfully".to_string(),
        list: list.into(),
    }))
}

/// Rename a list the calling account owns.
#[utoipa::path(
    put,
    path = "/api/todos/lists/{id}",
    params(("id" = String, Path, description = "List identifier")),
    request_body = ListRequest,
    tag = "Lists",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "List renamed", body = ListEnvelope),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "List missing or owned by another account"),
    )
)]
pub async fn update_list(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ListRequest>,
) -> Result<Json<ListEnvelope>, ApiError> {
    let list = state.db.rename_list(&identity.user_id, &id, &request.name)?;
    Ok(Json(ListEnvelope {
        message: "List updated successfully".to_string(),
        list: list.into(),
    }))
}

/// Delete a list and every todo inside it.
#[utoipa::path(
    delete,
    path = "/api/todos/lists/{id}",
    params(("id" = String, Path, description = "List identifier")),
    tag = "Lists",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "List and its todos deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "List missing or owned by another account"),
    )
)]
pub async fn delete_list(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.db.delete_list(&identity.user_id, &id)?;
    Ok(Json(MessageResponse {
        message: "List deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::state::tests::test_state;
    use axum::http::StatusCode;

    fn seeded_identity(state: &AppState, username: &str) -> Auth {
        let email = format!("{username}@gmail.com");
        let user = state.db.create_user(username, &email, "h").unwrap();
        Auth(AuthenticatedUser {
            user_id: user.id,
            username: user.username,
            email: user.email,
            expires_at: 0,
        })
    }

    #[tokio::test]
    async fn create_then_list_returns_owned_lists_only() {
        let (state, _dir) = test_state();
        let alice = seeded_identity(&state, "alice");
        let bob = seeded_identity(&state, "bob");

        create_list(
            alice.clone(),
            State(state.clone()),
            Json(ListRequest {
                name: "Work".to_string(),
            }),
        )
        .await
        .expect("creation succeeds");
        create_list(
            bob,
            State(state.clone()),
            Json(ListRequest {
                name: "Bob's".to_string(),
            }),
        )
        .await
        .expect("creation succeeds");

        let Json(lists) = get_lists(alice, State(state)).await.expect("listing succeeds");
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].name, "Work");
    }

    #[tokio::test]
    async fn update_list_renames_owned_list() {
        let (state, _dir) = test_state();
        let alice = seeded_identity(&state, "alice");
        let Json(created) = create_list(
            alice.clone(),
            State(state.clone()),
            Json(ListRequest {
                name: "Work".to_string(),
            }),
        )
        .await
        .expect("creation succeeds");

        let Json(renamed) = update_list(
            alice,
            State(state),
            Path(created.list.id.clone()),
            Json(ListRequest {
                name: "Projects".to_string(),
            }),
        )
        .await
        .expect("rename succeeds");

        assert_eq!(renamed.list.id, created.list.id);
        assert_eq!(renamed.list.name, "Projects");
    }

    #[tokio::test]
    async fn foreign_list_is_reported_as_not_found() {
        let (state, _dir) = test_state();
        let alice = seeded_identity(&state, "alice");
        let bob = seeded_identity(&state, "bob");
        let Json(created) = create_list(
            alice,
            State(state.clone()),
            Json(ListRequest {
                name: "Work".to_string(),
            }),
        )
        .await
        .expect("creation succeeds");

        let err = delete_list(bob, State(state), Path(created.list.id))
            .await
            .expect_err("foreign delete rejected");

        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_list_removes_it_from_listing() {
        let (state, _dir) = test_state();
        let alice = seeded_identity(&state, "alice");
        let Json(created) = create_list(
            alice.clone(),
            State(state.clone()),
            Json(ListRequest {
                name: "Work".to_string(),
            }),
        )
        .await
        .expect("creation succeeds");

        delete_list(alice.clone(), State(state.clone()), Path(created.list.id))
            .await
            .expect("delete succeeds");

        let Json(lists) = get_lists(alice, State(state)).await.expect("listing succeeds");
        assert!(lists.is_empty());
    }
}
