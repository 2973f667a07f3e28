use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;

use super::merged;
use crate::auth::RequireAuth;
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::MessageResponse;
use crate::server::response::{ApiError, ApiResponse, with_session};
use crate::service::buckets;
use crate::types::Bucket;

pub async fn list_buckets(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(list_id): Path<i64>,
) -> impl IntoResponse {
    let buckets = with_session(&state, |s| buckets::read_all(s, &auth, list_id))?;

    Ok::<_, ApiError>(Json(ApiResponse::success(buckets)))
}

pub async fn create_bucket(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(list_id): Path<i64>,
    Json(mut bucket): Json<Bucket>,
) -> impl IntoResponse {
    bucket.list_id = list_id;
    with_session(&state, |s| buckets::create(s, &auth, &mut bucket))?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(bucket))))
}

pub async fn update_bucket(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((list_id, bucket_id)): Path<(i64, i64)>,
    Json(patch): Json<Value>,
) -> impl IntoResponse {
    let bucket = with_session(&state, |s| {
        let current = buckets::load_bucket(s, bucket_id)?;
        if current.list_id != list_id {
            return Err(Error::BucketDoesNotBelongToList { bucket_id, list_id });
        }

        let mut bucket: Bucket = merged(&current, patch)?;
        bucket.id = bucket_id;
        buckets::update(s, &auth, &mut bucket)?;
        Ok(bucket)
    })?;

    Ok::<_, ApiError>(Json(ApiResponse::success(bucket)))
}

pub async fn delete_bucket(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((list_id, bucket_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    with_session(&state, |s| buckets::delete(s, &auth, list_id, bucket_id))?;

    Ok::<_, ApiError>(Json(MessageResponse::new("Successfully deleted.")))
}
