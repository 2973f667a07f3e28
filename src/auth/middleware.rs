use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, header::AUTHORIZATION, header::WWW_AUTHENTICATE, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::Auth;
use super::helpers::{
    TokenValidationError, ValidatedCredential, extract_token_from_header, validate_credential,
};
use crate::server::AppState;
use crate::types::{Token, User};

/// Extractor that requires a user or link share principal
pub struct RequireAuth(pub Auth);

/// Extractor that requires admin authentication
pub struct RequireAdmin(pub Token);

/// Extractor that requires a registered user (non-admin token with user_id)
pub struct RequireUser {
    pub token: Token,
    pub user: User,
}

#[derive(Debug)]
pub enum AuthError {
    MissingAuth,
    InvalidScheme,
    InvalidToken,
    TokenExpired,
    NotAdmin,
    NotUser,
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingAuth => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::InvalidScheme => (StatusCode::UNAUTHORIZED, "Invalid authorization scheme"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired"),
            AuthError::NotAdmin => (StatusCode::FORBIDDEN, "Admin access required"),
            AuthError::NotUser => (
                StatusCode::FORBIDDEN,
                "User token required for this operation",
            ),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = json!({ "data": null, "error": message });

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"tasklane\""),
            );
        }

        response
    }
}

impl From<TokenValidationError> for AuthError {
    fn from(e: TokenValidationError) -> Self {
        match e {
            TokenValidationError::InvalidScheme => AuthError::InvalidScheme,
            TokenValidationError::InvalidToken => AuthError::InvalidToken,
            TokenValidationError::TokenExpired => AuthError::TokenExpired,
            TokenValidationError::InternalError => AuthError::InternalError,
        }
    }
}

impl FromRequestParts<Arc<AppState>> for RequireAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match extract_and_validate(parts, state).await? {
            ValidatedCredential::LinkShare(auth) => Ok(RequireAuth(auth)),
            ValidatedCredential::Token { token, user } => {
                if token.is_admin {
                    return Err(AuthError::NotUser);
                }
                let user = user.ok_or(AuthError::NotUser)?;
                Ok(RequireAuth(Auth::User(user)))
            }
        }
    }
}

impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match extract_and_validate(parts, state).await? {
            ValidatedCredential::Token { token, .. } if token.is_admin => Ok(RequireAdmin(token)),
            _ => Err(AuthError::NotAdmin),
        }
    }
}

impl FromRequestParts<Arc<AppState>> for RequireUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match extract_and_validate(parts, state).await? {
            ValidatedCredential::Token { token, user } if !token.is_admin => {
                let user = user.ok_or(AuthError::NotUser)?;
                Ok(RequireUser { token, user })
            }
            _ => Err(AuthError::NotUser),
        }
    }
}

async fn extract_and_validate(
    parts: &Parts,
    state: &Arc<AppState>,
) -> Result<ValidatedCredential, AuthError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let raw_token = extract_token_from_header(auth_header)?.ok_or(AuthError::MissingAuth)?;

    Ok(validate_credential(state, &raw_token).await?)
}
