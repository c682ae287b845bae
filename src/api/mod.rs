// SPDX-License-Identifier: AGPL-3.0-or-later

//! HTTP surface: route table, OpenAPI document, Swagger UI.
//!
//! Everything under `/api` except register/login/refresh requires a bearer
//! access token; the `Auth` extractor enforces that per handler.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

pub mod auth;
pub mod lists;
pub mod tags;
pub mod todos;
pub mod users;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/token/refresh", post(auth::refresh))
        .route(
            "/users/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .route("/users/password", put(users::change_password))
        .route(
            "/todos/lists",
            get(lists::get_lists).post(lists::create_list),
        )
        .route(
            "/todos/lists/{id}",
            put(lists::update_list).delete(lists::delete_list),
        )
        .route(
            "/todos/items",
            get(todos::get_todos).post(todos::create_todo),
        )
        .route(
            "/todos/items/{id}",
            put(todos::update_todo).delete(todos::delete_todo),
        )
        .route("/todos/assign-tags", post(todos::assign_tags))
        .route("/todos/{todo_id}/tags", get(todos::get_tags_for_todo))
        .route(
            "/todos/{todo_id}/tags/{tag_id}",
            delete(todos::remove_tag_from_todo),
        )
        .route("/tags", get(tags::get_tags).post(tags::create_tag))
        .route(
            "/tags/{id}",
            put(tags::update_tag).delete(tags::delete_tag),
        )
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        auth::refresh,
        users::get_profile,
        users::update_profile,
        users::change_password,
        lists::get_lists,
        lists::create_list,
        lists::update_list,
        lists::delete_list,
        todos::get_todos,
        todos::create_todo,
        todos::update_todo,
        todos::delete_todo,
        todos::get_tags_for_todo,
        todos::assign_tags,
        todos::remove_tag_from_todo,
        tags::get_tags,
        tags::create_tag,
        tags::update_tag,
        tags::delete_tag
    ),
    components(
        schemas(
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::RefreshRequest,
            auth::MessageResponse,
            auth::LoginResponse,
            auth::TokenPairResponse,
            auth::UserSummary,
            users::ProfileResponse,
            users::ProfileSummary,
            users::UpdateProfileRequest,
            users::UpdateProfileResponse,
            users::ChangePasswordRequest,
            lists::ListRequest,
            lists::ListResponse,
            lists::ListEnvelope,
            todos::TodoRequest,
            todos::TodoResponse,
            todos::TodoEnvelope,
            todos::AssignTagsRequest,
            tags::TagRequest,
            tags::TagResponse,
            tags::TagEnvelope
        )
    ),
    tags(
        (name = "Auth", description = "Registration and session issuance"),
        (name = "Users", description = "Self-service account management"),
        (name = "Lists", description = "Per-account todo lists"),
        (name = "Todos", description = "Todos and tag associations"),
        (name = "Tags", description = "Global tag catalog")
    )
)]
struct ApiDoc;
