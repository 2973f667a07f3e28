use axum::{
    Json,
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use super::AppState;
use crate::error::{Error, ErrorKind};
use crate::service::Paged;
use crate::store::{Session, transact};

const TOTAL_PAGES: HeaderName = HeaderName::from_static("x-pagination-total-pages");
const RESULT_COUNT: HeaderName = HeaderName::from_static("x-pagination-result-count");

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }
}

/// One page of a listing, with the pagination headers clients page by.
pub struct PagedResponse<T: Serialize>(pub Paged<T>);

impl<T: Serialize> IntoResponse for PagedResponse<T> {
    fn into_response(self) -> Response {
        let total_pages = self.0.total_pages();
        let count = self.0.items.len();
        let mut response = Json(ApiResponse::success(self.0.items)).into_response();

        let headers = response.headers_mut();
        headers.insert(TOTAL_PAGES, HeaderValue::from(total_pages));
        headers.insert(RESULT_COUNT, HeaderValue::from(count));
        response
    }
}

/// API error that converts to a proper HTTP response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub code: i64,
}

impl ApiError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            code: 0,
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            code: 0,
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        let status = match e.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Internal => {
                tracing::error!("Request failed: {e}");
                return ApiError::internal("Internal server error");
            }
        };

        Self {
            status,
            message: e.to_string(),
            code: e.code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "data": null, "error": self.message, "code": self.code });
        (self.status, Json(body)).into_response()
    }
}

/// Runs `f` in one transaction, committing only when it succeeds.
pub fn with_session<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Session<'_>) -> crate::error::Result<T>,
{
    transact(state.store.as_ref(), f).map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_status() {
        let cases = [
            (Error::ListDoesNotExist { list_id: 1 }, StatusCode::NOT_FOUND, 3001),
            (Error::Forbidden, StatusCode::FORBIDDEN, 0),
            (Error::ListIsArchived { list_id: 1 }, StatusCode::PRECONDITION_FAILED, 3008),
            (Error::TaskCannotBeEmpty, StatusCode::BAD_REQUEST, 4001),
        ];
        for (error, status, code) in cases {
            let api = ApiError::from(error);
            assert_eq!(api.status, status);
            assert_eq!(api.code, code);
        }
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let api = ApiError::from(Error::Config("secret path".into()));
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, "Internal server error");
    }
}
