use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireAuth;
use crate::server::AppState;
use crate::server::dto::{LinkShareAuthRequest, MessageResponse};
use crate::server::response::{ApiError, ApiResponse, PagedResponse, with_session};
use crate::service::{PageRequest, link_shares};
use crate::types::LinkSharing;

pub async fn list_shares(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(list_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    let window = page.window(state.max_items_per_page);
    let page = with_session(&state, |s| link_shares::read_all(s, &auth, list_id, &window))?;

    Ok::<_, ApiError>(PagedResponse(page))
}

pub async fn create_share(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(list_id): Path<i64>,
    Json(mut share): Json<LinkSharing>,
) -> impl IntoResponse {
    share.list_id = list_id;
    let password = std::mem::take(&mut share.password);
    let password_hash = if password.is_empty() {
        None
    } else {
        Some(blocking(move || link_shares::hash_password(&password)).await?)
    };
    with_session(&state, |s| {
        link_shares::create(s, &auth, state.events.as_ref(), &mut share, password_hash)
    })?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(share))))
}

pub async fn get_share(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((list_id, share_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    let share = with_session(&state, |s| {
        let share = link_shares::read_one(s, &auth, share_id)?;
        if share.list_id != list_id {
            return Err(crate::error::Error::ListShareDoesNotExist {
                share_id,
                hash: String::new(),
            });
        }
        Ok(share)
    })?;

    Ok::<_, ApiError>(Json(ApiResponse::success(share)))
}

pub async fn delete_share(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((list_id, share_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    with_session(&state, |s| link_shares::delete(s, &auth, list_id, share_id))?;

    Ok::<_, ApiError>(Json(MessageResponse::new("The link share was successfully deleted")))
}

/// Runs password hashing off the async workers, after the session is gone.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> crate::error::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            tracing::error!("Password task failed: {e}");
            ApiError::internal("Internal server error")
        })?
        .map_err(ApiError::from)
}

/// Logs in with a share hash. Needs no credentials; the optional body only
/// carries the password of protected shares.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    Path(hash): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    let req: LinkShareAuthRequest = if body.is_empty() {
        LinkShareAuthRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::bad_request(e.to_string()))?
    };
    let share = with_session(&state, |s| link_shares::find_by_hash(s, &hash))?;
    let tokens = Arc::clone(&state);
    let login = blocking(move || link_shares::login(&tokens.link_tokens, &share, &req.password)).await?;

    Ok::<_, ApiError>(Json(ApiResponse::success(login)))
}
