//! Sharing lists and namespaces with users and teams.
//!
//! Users are addressed by username in paths and bodies, teams by id.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireAuth;
use crate::server::AppState;
use crate::server::dto::MessageResponse;
use crate::server::response::{ApiError, ApiResponse, PagedResponse, with_session};
use crate::service::{PageRequest, sharing};
use crate::types::{ListUser, NamespaceUser, TeamList, TeamNamespace};

const UNSHARED: &str = "Successfully deleted.";

// Lists

pub async fn list_list_users(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(list_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    let window = page.window(state.max_items_per_page);
    let scope = ListUser {
        list_id,
        ..Default::default()
    };
    let page = with_session(&state, |s| sharing::read_all_users(s, &auth, &scope, &window))?;

    Ok::<_, ApiError>(PagedResponse(page))
}

pub async fn share_list_with_user(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(list_id): Path<i64>,
    Json(mut relation): Json<ListUser>,
) -> impl IntoResponse {
    relation.list_id = list_id;
    with_session(&state, |s| {
        sharing::create(s, &auth, state.events.as_ref(), &mut relation)
    })?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(relation))))
}

pub async fn update_list_user(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((list_id, username)): Path<(i64, String)>,
    Json(mut relation): Json<ListUser>,
) -> impl IntoResponse {
    relation.list_id = list_id;
    relation.username = username;
    with_session(&state, |s| sharing::update(s, &auth, &mut relation))?;

    Ok::<_, ApiError>(Json(ApiResponse::success(relation)))
}

pub async fn unshare_list_with_user(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((list_id, username)): Path<(i64, String)>,
) -> impl IntoResponse {
    let mut relation = ListUser {
        list_id,
        username,
        ..Default::default()
    };
    with_session(&state, |s| sharing::delete(s, &auth, &mut relation))?;

    Ok::<_, ApiError>(Json(MessageResponse::new(UNSHARED)))
}

pub async fn list_list_teams(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(list_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    let window = page.window(state.max_items_per_page);
    let scope = TeamList {
        list_id,
        ..Default::default()
    };
    let page = with_session(&state, |s| sharing::read_all_teams(s, &auth, &scope, &window))?;

    Ok::<_, ApiError>(PagedResponse(page))
}

pub async fn share_list_with_team(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(list_id): Path<i64>,
    Json(mut relation): Json<TeamList>,
) -> impl IntoResponse {
    relation.list_id = list_id;
    with_session(&state, |s| {
        sharing::create(s, &auth, state.events.as_ref(), &mut relation)
    })?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(relation))))
}

pub async fn update_list_team(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((list_id, team_id)): Path<(i64, i64)>,
    Json(mut relation): Json<TeamList>,
) -> impl IntoResponse {
    relation.list_id = list_id;
    relation.team_id = team_id;
    with_session(&state, |s| sharing::update(s, &auth, &mut relation))?;

    Ok::<_, ApiError>(Json(ApiResponse::success(relation)))
}

pub async fn unshare_list_with_team(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((list_id, team_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    let mut relation = TeamList {
        list_id,
        team_id,
        ..Default::default()
    };
    with_session(&state, |s| sharing::delete(s, &auth, &mut relation))?;

    Ok::<_, ApiError>(Json(MessageResponse::new(UNSHARED)))
}

// Namespaces

pub async fn list_namespace_users(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(namespace_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    let window = page.window(state.max_items_per_page);
    let scope = NamespaceUser {
        namespace_id,
        ..Default::default()
    };
    let page = with_session(&state, |s| sharing::read_all_users(s, &auth, &scope, &window))?;

    Ok::<_, ApiError>(PagedResponse(page))
}

pub async fn share_namespace_with_user(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(namespace_id): Path<i64>,
    Json(mut relation): Json<NamespaceUser>,
) -> impl IntoResponse {
    relation.namespace_id = namespace_id;
    with_session(&state, |s| {
        sharing::create(s, &auth, state.events.as_ref(), &mut relation)
    })?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(relation))))
}

pub async fn update_namespace_user(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((namespace_id, username)): Path<(i64, String)>,
    Json(mut relation): Json<NamespaceUser>,
) -> impl IntoResponse {
    relation.namespace_id = namespace_id;
    relation.username = username;
    with_session(&state, |s| sharing::update(s, &auth, &mut relation))?;

    Ok::<_, ApiError>(Json(ApiResponse::success(relation)))
}

pub async fn unshare_namespace_with_user(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((namespace_id, username)): Path<(i64, String)>,
) -> impl IntoResponse {
    let mut relation = NamespaceUser {
        namespace_id,
        username,
        ..Default::default()
    };
    with_session(&state, |s| sharing::delete(s, &auth, &mut relation))?;

    Ok::<_, ApiError>(Json(MessageResponse::new(UNSHARED)))
}

pub async fn list_namespace_teams(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(namespace_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    let window = page.window(state.max_items_per_page);
    let scope = TeamNamespace {
        namespace_id,
        ..Default::default()
    };
    let page = with_session(&state, |s| sharing::read_all_teams(s, &auth, &scope, &window))?;

    Ok::<_, ApiError>(PagedResponse(page))
}

pub async fn share_namespace_with_team(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(namespace_id): Path<i64>,
    Json(mut relation): Json<TeamNamespace>,
) -> impl IntoResponse {
    relation.namespace_id = namespace_id;
    with_session(&state, |s| {
        sharing::create(s, &auth, state.events.as_ref(), &mut relation)
    })?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(relation))))
}

pub async fn update_namespace_team(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((namespace_id, team_id)): Path<(i64, i64)>,
    Json(mut relation): Json<TeamNamespace>,
) -> impl IntoResponse {
    relation.namespace_id = namespace_id;
    relation.team_id = team_id;
    with_session(&state, |s| sharing::update(s, &auth, &mut relation))?;

    Ok::<_, ApiError>(Json(ApiResponse::success(relation)))
}

pub async fn unshare_namespace_with_team(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((namespace_id, team_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    let mut relation = TeamNamespace {
        namespace_id,
        team_id,
        ..Default::default()
    };
    with_session(&state, |s| sharing::delete(s, &auth, &mut relation))?;

    Ok::<_, ApiError>(Json(MessageResponse::new(UNSHARED)))
}
