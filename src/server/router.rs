use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};

use super::{admin_router, dav_router, user_router};
use crate::auth::{LinkShareTokens, ProviderCache};
use crate::config::ServerConfig;
use crate::events::{Dispatcher, TracingDispatcher};
use crate::files::{FileStorage, LocalFileStorage};
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub data_dir: PathBuf,
    /// Public base URL for external access. Used for CalDAV hrefs.
    pub public_base_url: Option<String>,
    pub link_tokens: LinkShareTokens,
    pub events: Arc<dyn Dispatcher>,
    pub files: Arc<dyn FileStorage>,
    pub providers: ProviderCache,
    pub max_items_per_page: i64,
}

impl AppState {
    /// State with the default collaborators: local file storage under the
    /// data directory and events written to the log.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: &ServerConfig, jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            store,
            data_dir: config.data_dir.clone(),
            public_base_url: config.public_base_url.clone(),
            link_tokens: LinkShareTokens::new(jwt_secret, config.service.link_share_token_ttl_secs),
            events: Arc::new(TracingDispatcher),
            files: Arc::new(LocalFileStorage::new(config.data_dir.clone())),
            providers: ProviderCache::new(config.auth.openid.clone()),
            max_items_per_page: config.service.max_items_per_page,
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1/admin", admin_router())
        .nest("/api/v1", user_router())
        .nest("/dav", dav_router())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
