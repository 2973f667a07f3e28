use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};

use crate::auth::{Auth, TokenValidationError, ValidatedCredential, extract_token_from_header, validate_credential};
use crate::server::AppState;

/// Caller of a CalDAV request. Calendar clients mostly speak Basic auth, so
/// failures challenge with `Basic`.
pub struct DavAuth(pub Auth);

#[derive(Debug)]
pub enum DavAuthError {
    InvalidCredentials,
    TokenExpired,
    AdminTokenNotAllowed,
    AuthRequired,
    InternalError,
}

impl DavAuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::TokenExpired | Self::AuthRequired => StatusCode::UNAUTHORIZED,
            Self::AdminTokenNotAllowed => StatusCode::FORBIDDEN,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Invalid credentials",
            Self::TokenExpired => "Token expired",
            Self::AdminTokenNotAllowed => "Admin token cannot be used for calendar access",
            Self::AuthRequired => "Authentication required",
            Self::InternalError => "Internal server error",
        }
    }

    pub fn requires_auth_header(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials | Self::TokenExpired | Self::AuthRequired
        )
    }
}

impl IntoResponse for DavAuthError {
    fn into_response(self) -> Response {
        let mut response = (self.status_code(), self.message()).into_response();

        if self.requires_auth_header() {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"tasklane\""),
            );
        }

        response
    }
}

impl From<TokenValidationError> for DavAuthError {
    fn from(e: TokenValidationError) -> Self {
        match e {
            TokenValidationError::InvalidScheme | TokenValidationError::InvalidToken => {
                DavAuthError::InvalidCredentials
            }
            TokenValidationError::TokenExpired => DavAuthError::TokenExpired,
            TokenValidationError::InternalError => DavAuthError::InternalError,
        }
    }
}

impl FromRequestParts<Arc<AppState>> for DavAuth {
    type Rejection = DavAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let raw_token = extract_token_from_header(auth_header)?.ok_or(DavAuthError::AuthRequired)?;

        match validate_credential(state, &raw_token).await? {
            ValidatedCredential::LinkShare(auth) => Ok(DavAuth(auth)),
            ValidatedCredential::Token { token, .. } if token.is_admin => {
                Err(DavAuthError::AdminTokenNotAllowed)
            }
            ValidatedCredential::Token { user, .. } => user
                .map(|user| DavAuth(Auth::User(user)))
                .ok_or(DavAuthError::InvalidCredentials),
        }
    }
}
