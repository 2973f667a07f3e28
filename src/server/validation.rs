use crate::server::response::ApiError;

const MAX_USERNAME_LEN: usize = 250;
const MAX_TOKEN_LIFETIME_SECS: i64 = 10 * 365 * 24 * 3600;

fn is_valid_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'
}

pub fn validate_username(name: &str) -> Result<(), ApiError> {
    if name.len() > MAX_USERNAME_LEN {
        return Err(ApiError::bad_request(format!(
            "Username cannot exceed {MAX_USERNAME_LEN} characters"
        )));
    }
    if !name.chars().all(is_valid_username_char) {
        return Err(ApiError::bad_request(
            "Username can only contain alphanumeric characters, hyphens, underscores, and periods",
        ));
    }
    Ok(())
}

pub fn validate_token_lifetime(seconds: Option<i64>) -> Result<(), ApiError> {
    match seconds {
        Some(s) if s < 0 => Err(ApiError::bad_request("expires_in_seconds cannot be negative")),
        Some(s) if s > MAX_TOKEN_LIFETIME_SECS => Err(ApiError::bad_request(
            "expires_in_seconds cannot exceed ten years",
        )),
        _ => Ok(()),
    }
}
