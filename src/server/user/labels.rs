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
use crate::server::dto::{BulkLabelsRequest, MessageResponse};
use crate::server::response::{ApiError, ApiResponse, PagedResponse, with_session};
use crate::service::{PageRequest, labels};
use crate::types::{Label, LabelTask};

pub async fn list_labels(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    let window = page.window(state.max_items_per_page);
    let page = with_session(&state, |s| labels::read_all(s, &auth, &window))?;

    Ok::<_, ApiError>(PagedResponse(page))
}

pub async fn create_label(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(mut label): Json<Label>,
) -> impl IntoResponse {
    with_session(&state, |s| labels::create(s, &auth, &mut label))?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(label))))
}

pub async fn get_label(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let label = with_session(&state, |s| labels::read_one(s, &auth, id))?;

    Ok::<_, ApiError>(Json(ApiResponse::success(label)))
}

pub async fn update_label(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<Value>,
) -> impl IntoResponse {
    let label = with_session(&state, |s| {
        let mut label: Label = merged(&labels::read_one(s, &auth, id)?, patch)?;
        label.id = id;
        labels::update(s, &auth, &mut label)?;
        Ok(label)
    })?;

    Ok::<_, ApiError>(Json(ApiResponse::success(label)))
}

pub async fn delete_label(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    with_session(&state, |s| labels::delete(s, &auth, id))?;

    Ok::<_, ApiError>(Json(MessageResponse::new("Successfully deleted.")))
}

pub async fn list_task_labels(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    let window = page.window(state.max_items_per_page);
    let page = with_session(&state, |s| labels::read_all_for_task(s, &auth, task_id, &window))?;

    Ok::<_, ApiError>(PagedResponse(page))
}

pub async fn add_task_label(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<i64>,
    Json(mut label_task): Json<LabelTask>,
) -> impl IntoResponse {
    label_task.task_id = task_id;
    with_session(&state, |s| labels::add_to_task(s, &auth, &mut label_task))?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(label_task))))
}

pub async fn remove_task_label(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((task_id, label_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    let label_task = LabelTask {
        task_id,
        label_id,
        ..Default::default()
    };
    with_session(&state, |s| labels::remove_from_task(s, &auth, &label_task))?;

    Ok::<_, ApiError>(Json(MessageResponse::new("The label was successfully removed.")))
}

pub async fn bulk_set_task_labels(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<i64>,
    Json(req): Json<BulkLabelsRequest>,
) -> impl IntoResponse {
    let labels = with_session(&state, |s| labels::bulk_set(s, &auth, task_id, &req.labels))?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(labels))))
}
