use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, params};

use super::{Session, format_datetime, parse_datetime};
use crate::error::{Error, Result};

impl Session<'_> {
    pub fn record_migration(&self, user_id: i64, migrator_name: &str) -> Result<DateTime<Utc>> {
        let now = Utc::now();
        self.conn().execute(
            "INSERT INTO migration_status (user_id, migrator_name, created) VALUES (?1, ?2, ?3)",
            params![user_id, migrator_name, format_datetime(&now)],
        )?;
        Ok(now)
    }

    /// When the user last ran the named migrator, if ever.
    pub fn last_migration(&self, user_id: i64, migrator_name: &str) -> Result<Option<DateTime<Utc>>> {
        let created: Option<String> = self
            .conn()
            .query_row(
                "SELECT created FROM migration_status
                 WHERE user_id = ?1 AND migrator_name = ?2
                 ORDER BY id DESC LIMIT 1",
                params![user_id, migrator_name],
                |row| row.get(0),
            )
            .optional()
            .map_err(Error::from)?;
        Ok(created.map(|s| parse_datetime(&s)))
    }
}
