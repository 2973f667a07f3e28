use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;

use super::merged;
use crate::auth::RequireAuth;
use crate::server::AppState;
use crate::server::dto::{ArchivedQuery, MessageResponse};
use crate::server::response::{ApiError, ApiResponse, PagedResponse, with_session};
use crate::service::{PageRequest, namespaces};
use crate::types::Namespace;

pub async fn list_namespaces(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageRequest>,
    Query(archived): Query<ArchivedQuery>,
) -> impl IntoResponse {
    let window = page.window(state.max_items_per_page);
    let page = with_session(&state, |s| {
        namespaces::read_all(s, &auth, &window, archived.is_archived)
    })?;

    Ok::<_, ApiError>(PagedResponse(page))
}

pub async fn create_namespace(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(mut namespace): Json<Namespace>,
) -> impl IntoResponse {
    with_session(&state, |s| namespaces::create(s, &auth, &mut namespace))?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(namespace))))
}

pub async fn get_namespace(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let namespace = with_session(&state, |s| namespaces::read_one(s, &auth, id))?;

    Ok::<_, ApiError>(Json(ApiResponse::success(namespace)))
}

pub async fn update_namespace(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<Value>,
) -> impl IntoResponse {
    let namespace = with_session(&state, |s| {
        let mut namespace: Namespace = merged(&namespaces::read_one(s, &auth, id)?, patch)?;
        namespace.id = id;
        namespaces::update(s, &auth, &mut namespace)?;
        Ok(namespace)
    })?;

    Ok::<_, ApiError>(Json(ApiResponse::success(namespace)))
}

pub async fn delete_namespace(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    with_session(&state, |s| namespaces::delete(s, &auth, id))?;

    Ok::<_, ApiError>(Json(MessageResponse::new("Successfully deleted.")))
}
