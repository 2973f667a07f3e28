use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;

use super::{merged, read_uploads};
use crate::auth::RequireAuth;
use crate::server::AppState;
use crate::server::dto::{ArchivedQuery, MessageResponse, SetBackgroundRequest};
use crate::server::response::{ApiError, ApiResponse, PagedResponse, with_session};
use crate::service::{PageRequest, lists};
use crate::types::List;

pub async fn list_lists(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageRequest>,
    Query(archived): Query<ArchivedQuery>,
) -> impl IntoResponse {
    let window = page.window(state.max_items_per_page);
    let page = with_session(&state, |s| {
        lists::read_all(s, &auth, &window, archived.is_archived)
    })?;

    Ok::<_, ApiError>(PagedResponse(page))
}

/// Creates a list in the namespace from the path.
pub async fn create_list(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(namespace_id): Path<i64>,
    Json(mut list): Json<List>,
) -> impl IntoResponse {
    list.namespace_id = namespace_id;
    with_session(&state, |s| lists::create(s, &auth, &mut list))?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(list))))
}

pub async fn get_list(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let list = with_session(&state, |s| lists::read_one(s, &auth, id))?;

    Ok::<_, ApiError>(Json(ApiResponse::success(list)))
}

pub async fn update_list(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<Value>,
) -> impl IntoResponse {
    let list = with_session(&state, |s| {
        let mut list: List = merged(&lists::read_one(s, &auth, id)?, patch)?;
        list.id = id;
        lists::update(s, &auth, &mut list)?;
        Ok(list)
    })?;

    Ok::<_, ApiError>(Json(ApiResponse::success(list)))
}

pub async fn delete_list(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    with_session(&state, |s| lists::delete(s, &auth, id))?;

    Ok::<_, ApiError>(Json(MessageResponse::new("Successfully deleted.")))
}

pub async fn set_background(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<SetBackgroundRequest>,
) -> impl IntoResponse {
    let list = with_session(&state, |s| lists::set_background(s, &auth, id, req.file_id))?;

    Ok::<_, ApiError>(Json(ApiResponse::success(list)))
}

/// Takes the first file of the multipart field `background`.
pub async fn upload_background(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> impl IntoResponse {
    let mut uploads = read_uploads(multipart, "background").await?;
    let (name, content) = uploads.swap_remove(0);

    let list = with_session(&state, |s| {
        lists::upload_background(s, &auth, state.files.as_ref(), id, &name, &content)
    })?;

    Ok::<_, ApiError>(Json(ApiResponse::success(list)))
}
