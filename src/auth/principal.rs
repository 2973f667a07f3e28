use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Right, User};

/// The pseudo user behind an authenticated link share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkShareAuth {
    pub id: i64,
    pub hash: String,
    pub list_id: i64,
    pub right: Right,
    pub shared_by_id: i64,
}

/// Whoever performs a request: a registered user or a link share.
#[derive(Debug, Clone)]
pub enum Auth {
    User(User),
    LinkShare(LinkShareAuth),
}

impl Auth {
    /// Numeric identity. Users are positive; a link share is the negated
    /// share id, so the two never collide.
    #[must_use]
    pub fn id(&self) -> i64 {
        match self {
            Auth::User(user) => user.id,
            Auth::LinkShare(share) => -share.id,
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            Auth::User(user) => Some(user),
            Auth::LinkShare(_) => None,
        }
    }

    #[must_use]
    pub fn link_share(&self) -> Option<&LinkShareAuth> {
        match self {
            Auth::User(_) => None,
            Auth::LinkShare(share) => Some(share),
        }
    }

    #[must_use]
    pub fn is_link_share(&self) -> bool {
        matches!(self, Auth::LinkShare(_))
    }

    /// The registered user, or `Forbidden` for link shares.
    pub fn require_user(&self) -> Result<&User> {
        self.user().ok_or(Error::Forbidden)
    }
}

impl From<User> for Auth {
    fn from(user: User) -> Self {
        Auth::User(user)
    }
}

impl From<LinkShareAuth> for Auth {
    fn from(share: LinkShareAuth) -> Self {
        Auth::LinkShare(share)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_share_identity_is_negative() {
        let auth = Auth::from(LinkShareAuth {
            id: 7,
            hash: "abc".to_string(),
            list_id: 3,
            right: Right::READ,
            shared_by_id: 1,
        });
        assert_eq!(auth.id(), -7);
        assert!(auth.is_link_share());
        assert!(auth.require_user().is_err());
    }

    #[test]
    fn test_user_identity() {
        let auth = Auth::from(User {
            id: 4,
            username: "alice".to_string(),
            ..Default::default()
        });
        assert_eq!(auth.id(), 4);
        assert_eq!(auth.require_user().unwrap().username, "alice");
        assert!(auth.link_share().is_none());
    }
}
