use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::Auth;
use crate::error::Result;
use crate::store::Session;

/// When a named importer last ran for a user. `time` is `None` if it never did.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationStatus {
    pub migrator_name: String,
    pub time: Option<DateTime<Utc>>,
}

pub fn set_migration_status(s: &Session<'_>, auth: &Auth, migrator_name: &str) -> Result<MigrationStatus> {
    let user = auth.require_user()?;
    let time = s.record_migration(user.id, migrator_name)?;
    tracing::debug!(user_id = user.id, migrator_name, "Recorded migration");
    Ok(MigrationStatus {
        migrator_name: migrator_name.to_string(),
        time: Some(time),
    })
}

pub fn get_migration_status(s: &Session<'_>, auth: &Auth, migrator_name: &str) -> Result<MigrationStatus> {
    let user = auth.require_user()?;
    Ok(MigrationStatus {
        migrator_name: migrator_name.to_string(),
        time: s.last_migration(user.id, migrator_name)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testing::Fixture;
    use crate::types::Right;

    #[test]
    fn test_status_roundtrip() {
        let fx = Fixture::new();
        let link = fx.link_share_auth(Right::READ);
        let s = fx.session();
        let auth = fx.auth(&fx.bob);

        assert!(get_migration_status(&s, &auth, "todoist").unwrap().time.is_none());

        let set = set_migration_status(&s, &auth, "todoist").unwrap();
        let got = get_migration_status(&s, &auth, "todoist").unwrap();
        assert_eq!(got.time.map(|t| t.timestamp()), set.time.map(|t| t.timestamp()));
        assert!(get_migration_status(&s, &fx.auth(&fx.owner), "todoist").unwrap().time.is_none());

        assert!(matches!(
            set_migration_status(&s, &link, "todoist"),
            Err(Error::Forbidden)
        ));
    }
}
