//! In-process test application: a fresh data directory, an initialized
//! store and the full router, driven with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use axum::response::Response;
use base64::Engine;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use tasklane::auth::issue_token;
use tasklane::config::ServerConfig;
use tasklane::server::{AppState, create_router};
use tasklane::store::{SqliteStore, Store, transact};

pub struct TestApp {
    pub temp_dir: TempDir,
    pub state: Arc<AppState>,
    pub router: Router,
    pub admin_token: String,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let config = ServerConfig {
            data_dir: temp_dir.path().to_path_buf(),
            ..Default::default()
        };

        let store = SqliteStore::new(config.db_path()).expect("open store");
        store.initialize().expect("initialize store");
        let (_, admin_token) =
            transact(&store, |s| issue_token(s, true, None, None)).expect("issue admin token");

        let state = Arc::new(AppState::new(Arc::new(store), &config, "test-link-share-secret"));
        let router = create_router(state.clone());

        Self {
            temp_dir,
            state,
            router,
            admin_token,
        }
    }

    /// Creates a user straight in the store and returns its id and token.
    pub fn create_user(&self, username: &str) -> (i64, String) {
        transact(self.state.store.as_ref(), |s| {
            let user = s.create_user(username, "")?;
            let (_, raw) = issue_token(s, false, Some(user.id), None)?;
            Ok((user.id, raw))
        })
        .expect("create user")
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = self.send(request).await;
        into_test_response(response).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.json(Method::GET, uri, Some(token), None).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.json(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.json(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.json(Method::DELETE, uri, Some(token), None).await
    }

    /// A CalDAV request authenticated the way calendar clients do.
    pub async fn dav(&self, method: Method, uri: &str, token: &str, body: &str) -> (StatusCode, HeaderMap, String) {
        let credentials = base64::engine::general_purpose::STANDARD.encode(format!("x-token:{token}"));
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Basic {credentials}"))
            .header(header::CONTENT_TYPE, "text/calendar")
            .body(Body::from(body.to_string()))
            .expect("build request");

        let response = self.send(request).await;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
        (status, headers, String::from_utf8_lossy(&bytes).into_owned())
    }
}

pub async fn into_test_response(response: Response) -> TestResponse {
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    TestResponse {
        status,
        headers,
        body,
    }
}
