// SPDX-License-Identifier: AGPL-3.0-or-later

//! Todo endpoints and tag-association management, owner-scoped.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    api::auth::MessageResponse,
    api::tags::TagResponse,
    auth::Auth,
    error::ApiError,
    state::AppState,
    storage::{NewTodo, StoredTodo},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodoRequest {
    pub list_id: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<String>,
    /// Only honored on update; creation always starts incomplete.
    #[serde(default)]
    pub is_completed: Option<bool>,
}

impl TodoRequest {
    fn into_fields(self) -> (NewTodo, Option<bool>) {
        let input = NewTodo {
            list_id: self.list_id,
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            priority: self.priority,
        };
        (input, self.is_completed)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<String>,
    pub list_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StoredTodo> for TodoResponse {
    fn from(todo: StoredTodo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            description: todo.description,
            is_completed: todo.is_completed,
            due_date: todo.due_date,
            priority: todo.priority,
            list_id: todo.list_id,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TodoEnvelope {
    pub message: String,
    pub todo: TodoResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignTagsRequest {
    pub todo_id: String,
    pub tag_ids: Vec<String>,
}

/// All todos owned by the calling account, across lists.
#[utoipa::path(
    get,
    path = "/api/todos/items",
    tag = "Todos",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller's todos", body = [TodoResponse]),
        (status = 401, description = "Missing or invalid token"),
    )
)]
pub async fn get_todos(
    Auth(identity): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<TodoResponse>>, ApiError> {
    let todos = state.db.todos_for_owner(&identity.user_id)?;
    Ok(Json(todos.into_iter().map(Into::into).collect()))
}

/// Create a todo in one of the caller's lists.
///
/// The target list must belong to the caller; the todo starts incomplete.
#[utoipa::path(
    post,
    path = "/api/todos/items",
    request_body = TodoRequest,
    tag = "Todos",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Todo created", body = TodoEnvelope),
        (status = 400, description = "Target list missing or owned by another account"),
        (status = 401, description = "Missing or invalid token"),
    )
)]
pub async fn create_todo(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Json(request): Json<TodoRequest>,
) -> Result<Json<TodoEnvelope>, ApiError> {
    let (input, _) = request.into_fields();
    let todo = state.db.create_todo(&identity.user_id, input)?;
    Ok(Json(TodoEnvelope {
        message: "Todo created successfully".to_string(),
        todo: todo.into(),
    }))
}

/// Update a todo the calling account owns.
///
/// Reassignment to another list is allowed only when the caller owns the
/// target list too. Omitting isCompleted leaves the completion flag as is.
#[utoipa::path(
    put,
    path = "/api/todos/items/{id}",
    params(("id" = String, Path, description = "Todo identifier")),
    request_body = TodoRequest,
    tag = "Todos",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Todo updated", body = TodoEnvelope),
        (status = 400, description = "Target list missing or owned by another account"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Todo missing or owned by another account"),
    )
)]
pub async fn update_todo(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<TodoRequest>,
) -> Result<Json<TodoEnvelope>, ApiError> {
    let (input, is_completed) = request.into_fields();
    let todo = state
        .db
        .update_todo(&identity.user_id, &id, input, is_completed)?;
    Ok(Json(TodoEnvelope {
        message: "Todo updated successfully".to_string(),
        todo: todo.into(),
    }))
}

/// Delete a todo the calling account owns.
#[utoipa::path(
    delete,
    path = "/api/todos/items/{id}",
    params(("id" = String, Path, description = "Todo identifier")),
    tag = "Todos",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Todo deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Todo missing or owned by another account"),
    )
)]
pub async fn delete_todo(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.db.delete_todo(&identity.user_id, &id)?;
    Ok(Json(MessageResponse {
        message: "Todo deleted successfully".to_string(),
    }))
}

/// Tags currently assigned to a todo the calling account owns.
#[utoipa::path(
    get,
    path = "/api/todos/{todo_id}/tags",
    params(("todo_id" = String, Path, description = "Todo identifier")),
    tag = "Todos",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Assigned tags", body = [TagResponse]),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Todo missing or owned by another account"),
    )
)]
pub async fn get_tags_for_todo(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<TagResponse>>, ApiError> {
    let tags = state.db.tags_for_todo(&identity.user_id, &id)?;
    Ok(Json(tags.into_iter().map(Into::into).collect()))
}

/// Assign a batch of tags to a todo the calling account owns.
///
/// Duplicate ids, unknown tag ids, and tags already assigned are skipped
/// without error; repeating the call is a no-op.
#[utoipa::path(
    post,
    path = "/api/todos/assign-tags",
    request_body = AssignTagsRequest,
    tag = "Todos",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Tags assigned", body = MessageResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Todo missing or owned by another account"),
    )
)]
pub async fn assign_tags(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Json(request): Json<AssignTagsRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .db
        .assign_tags(&identity.user_id, &request.todo_id, &request.tag_ids)?;
    Ok(Json(MessageResponse {
        message: "Tags assigned successfully".to_string(),
    }))
}

/// Remove one assigned tag from a todo the calling account owns.
#[utoipa::path(
    delete,
    path = "/api/todos/{todo_id}/tags/{tag_id}",
    params(
        ("todo_id" = String, Path, description = "Todo identifier"),
        ("tag_id" = String, Path, description = "Tag identifier"),
    ),
    tag = "Todos",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Tag removed from the todo", body = MessageResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Todo not owned or tag not assigned"),
    )
)]
pub async fn remove_tag_from_todo(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Path((todo_id, tag_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .db
        .remove_tag_from_todo(&identity.user_id, &todo_id, &tag_id)?;
    Ok(Json(MessageResponse {
        message: "Tag removed from todo successfully".to_string(),
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

    fn seeded_list(state: &AppState, identity: &Auth, name: &str) -> String {
        state.db.create_list(&identity.0.user_id, name).unwrap().id
    }

    fn request_for(list_id: &str, title: &str) -> TodoRequest {
        TodoRequest {
            list_id: list_id.to_string(),
            title: title.to_string(),
            description: None,
            due_date: None,
            priority: None,
            is_completed: None,
        }
    }

    #[tokio::test]
    async fn create_todo_starts_incomplete() {
        let (state, _dir) = test_state();
        let alice = seeded_identity(&state, "alice");
        let list = seeded_list(&state, &alice, "Work");

        let Json(created) = create_todo(
            alice,
            State(state),
            Json(request_for(&list, "Ship release")),
        )
        .await
        .expect("creation succeeds");

        assert_eq!(created.todo.title, "Ship release");
        assert!(!created.todo.is_completed);
        assert_eq!(created.todo.list_id, list);
    }

    #[tokio::test]
    async fn create_todo_rejects_foreign_list() {
        let (state, _dir) = test_state();
        let alice = seeded_identity(&state, "alice");
        let bob = seeded_identity(&state, "bob");
        let bob_list = seeded_list(&state, &bob, "Bob's");

        let err = create_todo(
            alice,
            State(state),
            Json(request_for(&bob_list, "sneak")),
        )
        .await
        .expect_err("creation rejected");

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_todo_can_complete_and_preserves_flag_when_omitted() {
        let (state, _dir) = test_state();
        let alice = seeded_identity(&state, "alice");
        let list = seeded_list(&state, &alice, "Work");
        let Json(created) = create_todo(
            alice.clone(),
            State(state.clone()),
            Json(request_for(&list, "Ship release")),
        )
        .await
        .expect("creation succeeds");

        let mut complete = request_for(&list, "Ship release");
        complete.is_completed = Some(true);
        let Json(updated) = update_todo(
            alice.clone(),
            State(state.clone()),
            Path(created.todo.id.clone()),
            Json(complete),
        )
        .await
        .expect("update succeeds");
        assert!(updated.todo.is_completed);

        // A later update without the flag leaves completion untouched.
        let Json(renamed) = update_todo(
            alice,
            State(state),
            Path(created.todo.id),
            Json(request_for(&list, "Ship release v2")),
        )
        .await
        .expect("update succeeds");
        assert!(renamed.todo.is_completed);
        assert_eq!(renamed.todo.title, "Ship release v2");
    }

    #[tokio::test]
    async fn foreign_todo_is_reported_as_not_found() {
        let (state, _dir) = test_state();
        let alice = seeded_identity(&state, "alice");
        let bob = seeded_identity(&state, "bob");
        let list = seeded_list(&state, &alice, "Work");
        let Json(created) = create_todo(
            alice,
            State(state.clone()),
            Json(request_for(&list, "private")),
        )
        .await
        .expect("creation succeeds");

        let err = delete_todo(bob, State(state), Path(created.todo.id))
            .await
            .expect_err("foreign delete rejected");

        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn assign_tags_is_idempotent_and_listed_once() {
        let (state, _dir) = test_state();
        let alice = seeded_identity(&state, "alice");
        let list = seeded_list(&state, &alice, "Work");
        let Json(created) = create_todo(
            alice.clone(),
            State(state.clone()),
            Json(request_for(&list, "tag me")),
        )
        .await
        .expect("creation succeeds");
        let tag = state.db.create_tag("urgent").unwrap();

        let request = AssignTagsRequest {
            todo_id: created.todo.id.clone(),
            tag_ids: vec![tag.id.clone(), tag.id.clone(), "missing".to_string()],
        };
        assign_tags(alice.clone(), State(state.clone()), Json(request))
            .await
            .expect("assignment succeeds");
        // Second identical call succeeds without duplicating the pair.
        assign_tags(
            alice.clone(),
            State(state.clone()),
            Json(AssignTagsRequest {
                todo_id: created.todo.id.clone(),
                tag_ids: vec![tag.id.clone()],
            }),
        )
        .await
        .expect("repeat assignment succeeds");

        let Json(tags) = get_tags_for_todo(alice, State(state), Path(created.todo.id))
            .await
            .expect("tag listing succeeds");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].id, tag.id);
    }

    #[tokio::test]
    async fn remove_tag_requires_existing_association() {
        let (state, _dir) = test_state();
        let alice = seeded_identity(&state, "alice");
        let list = seeded_list(&state, &alice, "Work");
        let Json(created) = create_todo(
            alice.clone(),
            State(state.clone()),
            Json(request_for(&list, "untagged")),
        )
        .await
        .expect("creation succeeds");
        let tag = state.db.create_tag("urgent").unwrap();

        let err = remove_tag_from_todo(
            alice,
            State(state),
            Path((created.todo.id, tag.id)),
        )
        .await
        .expect_err("removal rejected");

        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
