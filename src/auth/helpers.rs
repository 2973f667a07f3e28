use std::sync::Arc;

use chrono::Utc;

use super::{Auth, LinkShareTokens, TokenGenerator, parse_token};
use crate::error::Error;
use crate::server::AppState;
use crate::types::{Token, User};

#[derive(Debug)]
pub enum TokenValidationError {
    InvalidScheme,
    InvalidToken,
    TokenExpired,
    InternalError,
}

/// What a bearer credential resolved to.
pub enum ValidatedCredential {
    /// An API token, with its user for non-admin tokens.
    Token { token: Token, user: Option<User> },
    LinkShare(Auth),
}

/// Extracts a token string from a Basic auth header.
/// Expects format: Basic base64(x-token:actual_token)
pub fn extract_basic_auth_token(header: &str) -> Option<String> {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    let encoded = header.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;

    let (username, password) = credentials.split_once(':')?;

    if username != "x-token" {
        return None;
    }

    Some(password.to_string())
}

/// Extracts token from Authorization header (Bearer or Basic).
/// Returns None if no auth header is present.
/// Returns Err if the auth scheme is unsupported.
pub fn extract_token_from_header(
    auth_header: Option<&str>,
) -> Result<Option<String>, TokenValidationError> {
    match auth_header {
        Some(header) => {
            if let Some(token) = header.strip_prefix("Bearer ") {
                Ok(Some(token.to_string()))
            } else if header.starts_with("Basic ") {
                extract_basic_auth_token(header)
                    .ok_or(TokenValidationError::InvalidToken)
                    .map(Some)
            } else {
                Err(TokenValidationError::InvalidScheme)
            }
        }
        None => Ok(None),
    }
}

/// Validates a raw credential. API tokens are checked against the store,
/// link share tokens only against their signature.
pub async fn validate_credential(
    state: &Arc<AppState>,
    raw_token: &str,
) -> Result<ValidatedCredential, TokenValidationError> {
    if parse_token(raw_token).is_err() && LinkShareTokens::looks_like_link_token(raw_token) {
        return match state.link_tokens.verify(raw_token) {
            Ok(share) => Ok(ValidatedCredential::LinkShare(Auth::LinkShare(share))),
            Err(Error::TokenExpired) => Err(TokenValidationError::TokenExpired),
            Err(_) => Err(TokenValidationError::InvalidToken),
        };
    }

    validate_api_token(state, raw_token).await
}

/// Looks the token row up, releases the store, verifies the argon2 hash on
/// the blocking pool and only then records the usage.
async fn validate_api_token(
    state: &Arc<AppState>,
    raw_token: &str,
) -> Result<ValidatedCredential, TokenValidationError> {
    let (lookup, _secret) =
        parse_token(raw_token).map_err(|_| TokenValidationError::InvalidToken)?;

    let token = {
        let session = state
            .store
            .session()
            .map_err(|_| TokenValidationError::InternalError)?;
        session
            .get_token_by_lookup(&lookup)
            .map_err(|_| TokenValidationError::InternalError)?
            .ok_or(TokenValidationError::InvalidToken)?
    };

    let raw = raw_token.to_string();
    let hash = token.token_hash.clone();
    let verified = tokio::task::spawn_blocking(move || TokenGenerator::new().verify(&raw, &hash))
        .await
        .map_err(|_| TokenValidationError::InternalError)?
        .map_err(|_| TokenValidationError::InternalError)?;
    if !verified {
        return Err(TokenValidationError::InvalidToken);
    }

    if let Some(expires_at) = &token.expires_at {
        if expires_at < &Utc::now() {
            return Err(TokenValidationError::TokenExpired);
        }
    }

    let session = state
        .store
        .session()
        .map_err(|_| TokenValidationError::InternalError)?;
    let user = match token.user_id {
        Some(user_id) => session
            .get_user(user_id)
            .map_err(|_| TokenValidationError::InternalError)?,
        None => None,
    };

    if let Err(e) = session.update_token_last_used(&token.id) {
        tracing::warn!("Failed to update token last_used_at: {e}");
    }
    if let Err(e) = session.commit() {
        tracing::warn!("Failed to commit token usage: {e}");
    }

    Ok(ValidatedCredential::Token { token, user })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer() {
        let token = extract_token_from_header(Some("Bearer abc")).unwrap();
        assert_eq!(token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_extract_basic_x_token() {
        use base64::Engine;
        use base64::engine::general_purpose::STANDARD;

        let header = format!("Basic {}", STANDARD.encode("x-token:secret"));
        let token = extract_token_from_header(Some(&header)).unwrap();
        assert_eq!(token.as_deref(), Some("secret"));

        let other = format!("Basic {}", STANDARD.encode("alice:secret"));
        assert!(extract_token_from_header(Some(&other)).is_err());
    }

    #[test]
    fn test_extract_rejects_unknown_scheme() {
        assert!(matches!(
            extract_token_from_header(Some("Digest abc")),
            Err(TokenValidationError::InvalidScheme)
        ));
        assert!(extract_token_from_header(None).unwrap().is_none());
    }
}
