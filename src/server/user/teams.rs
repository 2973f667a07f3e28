use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireAuth;
use crate::server::AppState;
use crate::server::dto::{AddMemberRequest, MessageResponse};
use crate::server::response::{ApiError, ApiResponse, with_session};
use crate::service::teams;
use crate::types::Team;

pub async fn list_teams(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let teams = with_session(&state, |s| teams::read_all(s, &auth))?;

    Ok::<_, ApiError>(Json(ApiResponse::success(teams)))
}

pub async fn create_team(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(mut team): Json<Team>,
) -> impl IntoResponse {
    with_session(&state, |s| teams::create(s, &auth, &mut team))?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(team))))
}

pub async fn get_team(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let team = with_session(&state, |s| teams::read_one(s, &auth, id))?;

    Ok::<_, ApiError>(Json(ApiResponse::success(team)))
}

pub async fn delete_team(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    with_session(&state, |s| teams::delete(s, &auth, id))?;

    Ok::<_, ApiError>(Json(MessageResponse::new("Successfully deleted.")))
}

pub async fn add_member(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<AddMemberRequest>,
) -> impl IntoResponse {
    let member = with_session(&state, |s| {
        teams::add_member(s, &auth, id, &req.username, req.admin)
    })?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(member))))
}

pub async fn remove_member(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((id, username)): Path<(i64, String)>,
) -> impl IntoResponse {
    with_session(&state, |s| teams::remove_member(s, &auth, id, &username))?;

    Ok::<_, ApiError>(Json(MessageResponse::new("Successfully removed.")))
}
