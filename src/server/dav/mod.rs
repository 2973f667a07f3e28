//! CalDAV access to lists: one calendar per list, one `.ics` resource per
//! task, addressed by the task uid.

mod auth;
mod handlers;

use std::sync::Arc;

use axum::{Router, routing::get};

use crate::server::AppState;

pub fn dav_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/lists/{id}", get(handlers::get_calendar))
        .route(
            "/lists/{id}/{file}",
            get(handlers::get_task).put(handlers::put_task).delete(handlers::delete_task),
        )
}
