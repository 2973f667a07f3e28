use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::auth::{Auth, RequireUser};
use crate::server::AppState;
use crate::server::dto::{AvatarProviderBody, CurrentUserResponse, MessageResponse};
use crate::server::response::{ApiError, ApiResponse, with_session};
use crate::service::users::{self, GeneralSettings};

/// The caller with their private settings.
pub async fn get_current_user(
    RequireUser { user, .. }: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let auth = Auth::User(user);
    let user = with_session(&state, |s| users::current(s, &auth))?;

    Ok::<_, ApiError>(Json(ApiResponse::success(CurrentUserResponse::from(user))))
}

pub async fn update_general_settings(
    RequireUser { user, .. }: RequireUser,
    State(state): State<Arc<AppState>>,
    Json(settings): Json<GeneralSettings>,
) -> impl IntoResponse {
    let auth = Auth::User(user);
    with_session(&state, |s| users::update_general_settings(s, &auth, &settings))?;

    Ok::<_, ApiError>(Json(MessageResponse::new("The settings were updated successfully.")))
}

pub async fn get_avatar_provider(
    RequireUser { user, .. }: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let auth = Auth::User(user);
    let user = with_session(&state, |s| users::current(s, &auth))?;

    Ok::<_, ApiError>(Json(ApiResponse::success(AvatarProviderBody {
        avatar_provider: user.settings.avatar_provider.as_str().to_string(),
    })))
}

pub async fn set_avatar_provider(
    RequireUser { user, .. }: RequireUser,
    State(state): State<Arc<AppState>>,
    Json(body): Json<AvatarProviderBody>,
) -> impl IntoResponse {
    let auth = Auth::User(user);
    with_session(&state, |s| {
        users::set_avatar_provider(s, &auth, &body.avatar_provider)
    })?;

    Ok::<_, ApiError>(Json(MessageResponse::new("Avatar was changed successfully.")))
}
