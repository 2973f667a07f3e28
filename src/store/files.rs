use chrono::Utc;
use rusqlite::{OptionalExtension, params};

use super::{Session, format_datetime, parse_datetime};
use crate::error::{Error, Result};
use crate::types::File;

impl Session<'_> {
    /// Records file metadata; the bytes live in the file storage.
    pub fn create_file(&self, name: &str, size: i64, created_by_id: i64) -> Result<File> {
        let now = Utc::now();
        self.conn().execute(
            "INSERT INTO files (name, size, created_by_id, created) VALUES (?1, ?2, ?3, ?4)",
            params![name, size, created_by_id, format_datetime(&now)],
        )?;
        Ok(File {
            id: self.last_insert_rowid(),
            name: name.to_string(),
            size,
            created_by_id,
            created: now,
            content: Vec::new(),
        })
    }

    pub fn get_file(&self, id: i64) -> Result<Option<File>> {
        self.conn()
            .query_row(
                "SELECT id, name, size, created_by_id, created FROM files WHERE id = ?1",
                params![id],
                |row| {
                    Ok(File {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        size: row.get(2)?,
                        created_by_id: row.get(3)?,
                        created: parse_datetime(&row.get::<_, String>(4)?),
                        content: Vec::new(),
                    })
                },
            )
            .optional()
            .map_err(Error::from)
    }
}
