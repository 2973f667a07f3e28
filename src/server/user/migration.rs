use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::auth::{Auth, RequireUser};
use crate::migration::{NamespaceStructure, get_migration_status, insert_from_structure, set_migration_status};
use crate::server::AppState;
use crate::server::dto::MessageResponse;
use crate::server::response::{ApiError, ApiResponse, with_session};

const STRUCTURE_MIGRATOR: &str = "structure";

/// Imports a complete namespace tree exported from another task manager.
pub async fn import_structure(
    RequireUser { user, .. }: RequireUser,
    State(state): State<Arc<AppState>>,
    Json(mut structure): Json<Vec<NamespaceStructure>>,
) -> impl IntoResponse {
    let auth = Auth::User(user);
    insert_from_structure(
        state.store.as_ref(),
        &auth,
        state.events.as_ref(),
        state.files.as_ref(),
        &mut structure,
    )?;
    with_session(&state, |s| set_migration_status(s, &auth, STRUCTURE_MIGRATOR))?;

    Ok::<_, ApiError>(Json(MessageResponse::new("Everything was migrated successfully.")))
}

pub async fn migration_status(
    RequireUser { user, .. }: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let auth = Auth::User(user);
    let status = with_session(&state, |s| get_migration_status(s, &auth, &name))?;

    Ok::<_, ApiError>(Json(ApiResponse::success(status)))
}
