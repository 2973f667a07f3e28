use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Label, Token, User, UserSettings};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateUserTokenRequest {
    pub expires_in_seconds: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub id: String,
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

impl From<Token> for TokenResponse {
    fn from(token: Token) -> Self {
        Self {
            id: token.id,
            is_admin: token.is_admin,
            user_id: token.user_id,
            created_at: token.created_at,
            expires_at: token.expires_at,
            last_used_at: token.last_used_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateTokenResponse {
    /// The raw token. Only ever shown once.
    pub token: String,
    #[serde(flatten)]
    pub metadata: TokenResponse,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ArchivedQuery {
    pub is_archived: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LinkShareAuthRequest {
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AvatarProviderBody {
    pub avatar_provider: String,
}

/// The caller's own user, the only place settings are exposed.
#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    #[serde(flatten)]
    pub user: User,
    pub settings: UserSettings,
}

impl From<User> for CurrentUserResponse {
    fn from(mut user: User) -> Self {
        let settings = std::mem::take(&mut user.settings);
        Self { user, settings }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub username: String,
    #[serde(default)]
    pub admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct BulkLabelsRequest {
    pub labels: Vec<Label>,
}

#[derive(Debug, Deserialize)]
pub struct SetBackgroundRequest {
    pub file_id: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CalendarQuery {
    pub component: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
