use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{Duration, Utc};

use super::users::load_user;
use crate::auth::{RequireAdmin, issue_token};
use crate::server::AppState;
use crate::server::dto::{CreateTokenResponse, CreateUserTokenRequest, TokenResponse};
use crate::server::response::{ApiError, ApiResponse, with_session};
use crate::server::validation::validate_token_lifetime;

pub async fn list_user_tokens(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let tokens = with_session(&state, |s| {
        let user = load_user(s, id)?;
        s.list_user_tokens(user.id)
    })?;

    let responses: Vec<TokenResponse> = tokens.into_iter().map(TokenResponse::from).collect();
    Ok::<_, ApiError>(Json(ApiResponse::success(responses)))
}

pub async fn create_user_token(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CreateUserTokenRequest>,
) -> impl IntoResponse {
    validate_token_lifetime(req.expires_in_seconds)?;
    let expires_at = req.expires_in_seconds.map(|s| Utc::now() + Duration::seconds(s));

    let (token, raw_token) = with_session(&state, |s| {
        let user = load_user(s, id)?;
        issue_token(s, false, Some(user.id), expires_at)
    })?;
    tracing::info!(user_id = id, token_id = %token.id, "Issued user token");

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreateTokenResponse {
            token: raw_token,
            metadata: token.into(),
        })),
    ))
}

pub async fn delete_token(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if id == admin.0.id {
        return Err(ApiError::bad_request("Cannot delete current token"));
    }

    let deleted = with_session(&state, |s| s.delete_token(&id))?;
    if !deleted {
        return Err(ApiError {
            status: StatusCode::NOT_FOUND,
            message: "Token not found".into(),
            code: 0,
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
