mod tokens;
mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::server::AppState;

pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        // User routes
        .route("/users", post(users::create_user))
        .route("/users", get(users::list_users))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}", delete(users::delete_user))
        // Token routes
        .route("/users/{id}/tokens", get(tokens::list_user_tokens))
        .route("/users/{id}/tokens", post(tokens::create_user_token))
        .route("/tokens/{id}", delete(tokens::delete_token))
}
