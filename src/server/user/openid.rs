use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse};

/// Providers clients can offer for login. Public.
pub async fn list_providers(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::success(state.providers.providers()))
}

pub async fn get_provider(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    let provider = state.providers.get_provider(&key)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(provider)))
}
