use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireAdmin;
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::CreateUserRequest;
use crate::server::response::{ApiError, ApiResponse, with_session};
use crate::server::validation::validate_username;
use crate::service::PageRequest;
use crate::store::Session;
use crate::types::User;

pub(super) fn load_user(s: &Session<'_>, id: i64) -> crate::error::Result<User> {
    s.get_user(id)?.ok_or(Error::UserDoesNotExist { user: id.to_string() })
}

pub async fn create_user(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> impl IntoResponse {
    let username = req.username.trim();
    if username.is_empty() {
        return Err(ApiError::from(Error::UsernameCannotBeEmpty));
    }
    validate_username(username)?;

    let user = with_session(&state, |s| s.create_user(username, req.email.trim()))?;
    tracing::info!(user_id = user.id, username = %user.username, "Created user");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

pub async fn list_users(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageRequest>,
) -> impl IntoResponse {
    let window = params.window(state.max_items_per_page);
    let users = with_session(&state, |s| s.list_users(&window.search, window.limit, window.offset))?;

    Ok::<_, ApiError>(Json(ApiResponse::success(users)))
}

pub async fn get_user(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let user = with_session(&state, |s| load_user(s, id))?;

    Ok::<_, ApiError>(Json(ApiResponse::success(user)))
}

pub async fn delete_user(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    with_session(&state, |s| {
        let user = load_user(s, id)?;
        s.delete_user(user.id)
    })?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
