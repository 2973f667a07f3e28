use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};

use super::{Session, format_datetime, like_pattern, parse_datetime};
use crate::error::{Error, Result};
use crate::types::{LinkSharing, Right, SharingType};

const LINK_SHARE_COLUMNS: &str =
    "id, hash, name, list_id, access_right, sharing_type, password, shared_by_id, created, updated";

fn link_share_from_row(row: &Row<'_>) -> rusqlite::Result<LinkSharing> {
    let sharing_type: i64 = row.get(5)?;
    Ok(LinkSharing {
        id: row.get(0)?,
        hash: row.get(1)?,
        name: row.get(2)?,
        list_id: row.get(3)?,
        right: Right::from(row.get::<_, i64>(4)?),
        sharing_type: SharingType::try_from(sharing_type).unwrap_or_default(),
        password: row.get(6)?,
        shared_by: None,
        shared_by_id: row.get(7)?,
        created: parse_datetime(&row.get::<_, String>(8)?),
        updated: parse_datetime(&row.get::<_, String>(9)?),
    })
}

impl Session<'_> {
    /// Stores a link share. `share.password` must already hold the bcrypt hash.
    pub fn create_link_share(&self, share: &mut LinkSharing) -> Result<()> {
        let now = Utc::now();
        self.conn().execute(
            "INSERT INTO link_shares (hash, name, list_id, access_right, sharing_type, password, shared_by_id, created, updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                share.hash,
                share.name,
                share.list_id,
                share.right.value(),
                i64::from(share.sharing_type),
                share.password,
                share.shared_by_id,
                format_datetime(&now),
            ],
        )?;
        share.id = self.last_insert_rowid();
        share.created = now;
        share.updated = now;
        Ok(())
    }

    pub fn get_link_share(&self, id: i64) -> Result<Option<LinkSharing>> {
        self.conn()
            .query_row(
                &format!("SELECT {LINK_SHARE_COLUMNS} FROM link_shares WHERE id = ?1"),
                params![id],
                link_share_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    pub fn get_link_share_by_hash(&self, hash: &str) -> Result<Option<LinkSharing>> {
        self.conn()
            .query_row(
                &format!("SELECT {LINK_SHARE_COLUMNS} FROM link_shares WHERE hash = ?1"),
                params![hash],
                link_share_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    pub fn list_link_shares(
        &self,
        list_id: i64,
        search: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LinkSharing>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {LINK_SHARE_COLUMNS} FROM link_shares
             WHERE list_id = ?1 AND hash LIKE ?2 ESCAPE '\\'
             ORDER BY id LIMIT ?3 OFFSET ?4"
        ))?;

        let rows = stmt.query_map(
            params![list_id, like_pattern(search), limit, offset],
            link_share_from_row,
        )?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    pub fn count_link_shares(&self, list_id: i64, search: &str) -> Result<i64> {
        self.conn()
            .query_row(
                "SELECT COUNT(*) FROM link_shares WHERE list_id = ?1 AND hash LIKE ?2 ESCAPE '\\'",
                params![list_id, like_pattern(search)],
                |row| row.get(0),
            )
            .map_err(Error::from)
    }

    pub fn delete_link_share(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM link_shares WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}
