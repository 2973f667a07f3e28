use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde_json::Value;

use super::{merged, read_uploads};
use crate::auth::RequireAuth;
use crate::server::AppState;
use crate::server::dto::MessageResponse;
use crate::server::response::{ApiError, ApiResponse, PagedResponse, with_session};
use crate::service::{PageRequest, tasks};
use crate::types::{RelationKind, Task, TaskRelation};

pub async fn list_tasks(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(list_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    let window = page.window(state.max_items_per_page);
    let page = with_session(&state, |s| tasks::read_all(s, &auth, list_id, &window))?;

    Ok::<_, ApiError>(PagedResponse(page))
}

/// Creates a task in the list from the path.
pub async fn create_task(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(list_id): Path<i64>,
    Json(mut task): Json<Task>,
) -> impl IntoResponse {
    task.list_id = list_id;
    with_session(&state, |s| {
        tasks::create(s, &auth, state.events.as_ref(), &mut task)
    })?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(task))))
}

pub async fn get_task(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let task = with_session(&state, |s| tasks::read_one(s, &auth, id))?;

    Ok::<_, ApiError>(Json(ApiResponse::success(task)))
}

pub async fn update_task(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<Value>,
) -> impl IntoResponse {
    let task = with_session(&state, |s| {
        let mut task: Task = merged(&tasks::read_one(s, &auth, id)?, patch)?;
        task.id = id;
        tasks::update(s, &auth, &mut task)?;
        Ok(task)
    })?;

    Ok::<_, ApiError>(Json(ApiResponse::success(task)))
}

pub async fn delete_task(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    with_session(&state, |s| tasks::delete(s, &auth, id))?;

    Ok::<_, ApiError>(Json(MessageResponse::new("Successfully deleted.")))
}

pub async fn create_relation(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<i64>,
    Json(mut relation): Json<TaskRelation>,
) -> impl IntoResponse {
    relation.task_id = task_id;
    with_session(&state, |s| tasks::create_relation(s, &auth, &mut relation))?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(relation))))
}

pub async fn delete_relation(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((task_id, kind, other_task_id)): Path<(i64, String, i64)>,
) -> impl IntoResponse {
    let relation_kind: RelationKind = kind.parse().map_err(ApiError::from)?;
    let relation = TaskRelation {
        task_id,
        other_task_id,
        relation_kind,
        created_by_id: 0,
        created: chrono::Utc::now(),
    };
    with_session(&state, |s| tasks::delete_relation(s, &auth, &relation))?;

    Ok::<_, ApiError>(Json(MessageResponse::new("The task relation was deleted successfully.")))
}

/// Attaches every file of the multipart field `files`.
pub async fn upload_attachments(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<i64>,
    multipart: Multipart,
) -> impl IntoResponse {
    let uploads = read_uploads(multipart, "files").await?;

    let attachments = with_session(&state, |s| {
        uploads
            .iter()
            .map(|(name, content)| {
                tasks::add_attachment(s, &auth, state.files.as_ref(), task_id, name, content)
            })
            .collect::<crate::error::Result<Vec<_>>>()
    })?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(attachments))))
}

pub async fn download_attachment(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((task_id, attachment_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    let (attachment, content) = with_session(&state, |s| {
        tasks::read_attachment(s, &auth, state.files.as_ref(), task_id, attachment_id)
    })?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        attachment.file.name.replace('"', "")
    );
    Ok::<_, ApiError>((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        content,
    ))
}
