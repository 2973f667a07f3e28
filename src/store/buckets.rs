use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};

use super::{Session, format_datetime, parse_datetime};
use crate::error::{Error, Result};
use crate::types::Bucket;

const BUCKET_COLUMNS: &str =
    "id, title, list_id, task_limit, is_done_bucket, position, created_by_id, created, updated";

fn bucket_from_row(row: &Row<'_>) -> rusqlite::Result<Bucket> {
    Ok(Bucket {
        id: row.get(0)?,
        title: row.get(1)?,
        list_id: row.get(2)?,
        limit: row.get(3)?,
        is_done_bucket: row.get(4)?,
        position: row.get(5)?,
        created_by_id: row.get(6)?,
        created: parse_datetime(&row.get::<_, String>(7)?),
        updated: parse_datetime(&row.get::<_, String>(8)?),
    })
}

impl Session<'_> {
    pub fn create_bucket(&self, bucket: &mut Bucket) -> Result<()> {
        let now = Utc::now();
        self.conn().execute(
            "INSERT INTO buckets (title, list_id, task_limit, is_done_bucket, position, created_by_id, created, updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                bucket.title,
                bucket.list_id,
                bucket.limit,
                bucket.is_done_bucket,
                bucket.position,
                bucket.created_by_id,
                format_datetime(&now),
            ],
        )?;
        bucket.id = self.last_insert_rowid();
        bucket.created = now;
        bucket.updated = now;
        Ok(())
    }

    pub fn get_bucket(&self, id: i64) -> Result<Option<Bucket>> {
        self.conn()
            .query_row(
                &format!("SELECT {BUCKET_COLUMNS} FROM buckets WHERE id = ?1"),
                params![id],
                bucket_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    pub fn update_bucket(&self, bucket: &mut Bucket) -> Result<()> {
        bucket.updated = Utc::now();
        self.conn().execute(
            "UPDATE buckets SET title = ?1, task_limit = ?2, is_done_bucket = ?3, position = ?4, updated = ?5
             WHERE id = ?6",
            params![
                bucket.title,
                bucket.limit,
                bucket.is_done_bucket,
                bucket.position,
                format_datetime(&bucket.updated),
                bucket.id,
            ],
        )?;
        Ok(())
    }

    pub fn delete_bucket(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM buckets WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn list_buckets(&self, list_id: i64) -> Result<Vec<Bucket>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {BUCKET_COLUMNS} FROM buckets WHERE list_id = ?1 ORDER BY position, id"
        ))?;

        let rows = stmt.query_map(params![list_id], bucket_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    pub fn count_buckets(&self, list_id: i64) -> Result<i64> {
        self.conn()
            .query_row(
                "SELECT COUNT(*) FROM buckets WHERE list_id = ?1",
                params![list_id],
                |row| row.get(0),
            )
            .map_err(Error::from)
    }

    /// The bucket new tasks land in when none is given: the first one by position.
    pub fn default_bucket(&self, list_id: i64) -> Result<Option<Bucket>> {
        self.conn()
            .query_row(
                &format!(
                    "SELECT {BUCKET_COLUMNS} FROM buckets WHERE list_id = ?1 ORDER BY position, id LIMIT 1"
                ),
                params![list_id],
                bucket_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    pub fn done_bucket(&self, list_id: i64) -> Result<Option<Bucket>> {
        self.conn()
            .query_row(
                &format!(
                    "SELECT {BUCKET_COLUMNS} FROM buckets WHERE list_id = ?1 AND is_done_bucket = 1 LIMIT 1"
                ),
                params![list_id],
                bucket_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    pub fn count_tasks_in_bucket(&self, bucket_id: i64) -> Result<i64> {
        self.conn()
            .query_row(
                "SELECT COUNT(*) FROM tasks WHERE bucket_id = ?1",
                params![bucket_id],
                |row| row.get(0),
            )
            .map_err(Error::from)
    }

    pub fn move_bucket_tasks(&self, from_bucket_id: i64, to_bucket_id: i64) -> Result<()> {
        self.conn().execute(
            "UPDATE tasks SET bucket_id = ?1 WHERE bucket_id = ?2",
            params![to_bucket_id, from_bucket_id],
        )?;
        Ok(())
    }
}
