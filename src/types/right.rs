use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Right is the access level a user, team or link share holds on a resource.
/// Higher values include everything granted by lower ones.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Right(i64);

impl Right {
    pub const READ: Right = Right(0);
    pub const READ_WRITE: Right = Right(1);
    pub const ADMIN: Right = Right(2);

    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> i64 {
        self.0
    }

    /// Rejects anything outside read, read-write and admin.
    pub fn is_valid(self) -> Result<()> {
        match self {
            Self::READ | Self::READ_WRITE | Self::ADMIN => Ok(()),
            right => Err(Error::InvalidRight { right }),
        }
    }

    #[must_use]
    pub fn can_write(self) -> bool {
        self >= Self::READ_WRITE
    }

    #[must_use]
    pub fn is_admin(self) -> bool {
        self >= Self::ADMIN
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::READ => "read",
            Self::READ_WRITE => "read_write",
            Self::ADMIN => "admin",
            _ => "invalid",
        }
    }
}

impl fmt::Display for Right {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.name())
    }
}

impl From<i64> for Right {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Right> for i64 {
    fn from(r: Right) -> Self {
        r.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_rights() {
        assert!(Right::READ.is_valid().is_ok());
        assert!(Right::READ_WRITE.is_valid().is_ok());
        assert!(Right::ADMIN.is_valid().is_ok());
    }

    #[test]
    fn test_invalid_rights() {
        for value in [-1, 3, 42, i64::MAX, i64::MIN] {
            let err = Right::new(value).is_valid().unwrap_err();
            assert!(matches!(err, Error::InvalidRight { right } if right.value() == value));
        }
    }

    #[test]
    fn test_ordering() {
        assert!(Right::ADMIN > Right::READ_WRITE);
        assert!(Right::READ_WRITE.can_write());
        assert!(!Right::READ.can_write());
        assert!(Right::ADMIN.is_admin());
        assert!(!Right::READ_WRITE.is_admin());
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&Right::ADMIN).unwrap();
        assert_eq!(json, "2");
        let parsed: Right = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, Right::READ_WRITE);
    }
}
