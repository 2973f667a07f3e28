use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};

use super::{Session, format_datetime, like_pattern, parse_datetime};
use crate::error::{Error, Result};
use crate::types::Namespace;

const NAMESPACE_COLUMNS: &str = "namespaces.id, namespaces.title, namespaces.description, namespaces.owner_id,
     namespaces.is_archived, namespaces.hex_color, namespaces.created, namespaces.updated";

fn namespace_from_row(row: &Row<'_>) -> rusqlite::Result<Namespace> {
    Ok(Namespace {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        owner_id: row.get(3)?,
        is_archived: row.get(4)?,
        hex_color: row.get(5)?,
        created: parse_datetime(&row.get::<_, String>(6)?),
        updated: parse_datetime(&row.get::<_, String>(7)?),
    })
}

impl Session<'_> {
    pub fn create_namespace(&self, ns: &mut Namespace) -> Result<()> {
        let now = Utc::now();
        self.conn().execute(
            "INSERT INTO namespaces (title, description, owner_id, is_archived, hex_color, created, updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                ns.title,
                ns.description,
                ns.owner_id,
                ns.is_archived,
                ns.hex_color,
                format_datetime(&now),
            ],
        )?;
        ns.id = self.last_insert_rowid();
        ns.created = now;
        ns.updated = now;
        Ok(())
    }

    pub fn get_namespace(&self, id: i64) -> Result<Option<Namespace>> {
        self.conn()
            .query_row(
                &format!("SELECT {NAMESPACE_COLUMNS} FROM namespaces WHERE id = ?1"),
                params![id],
                namespace_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    pub fn update_namespace(&self, ns: &mut Namespace) -> Result<()> {
        ns.updated = Utc::now();
        self.conn().execute(
            "UPDATE namespaces SET title = ?1, description = ?2, is_archived = ?3, hex_color = ?4, updated = ?5
             WHERE id = ?6",
            params![
                ns.title,
                ns.description,
                ns.is_archived,
                ns.hex_color,
                format_datetime(&ns.updated),
                ns.id,
            ],
        )?;
        Ok(())
    }

    pub fn delete_namespace(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM namespaces WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn touch_namespace(&self, id: i64) -> Result<()> {
        self.conn().execute(
            "UPDATE namespaces SET updated = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(())
    }

    /// Namespaces the user owns or reaches through a user or team share.
    pub fn list_user_namespaces(
        &self,
        user_id: i64,
        search: &str,
        include_archived: bool,
    ) -> Result<Vec<Namespace>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT DISTINCT {NAMESPACE_COLUMNS} FROM namespaces
             LEFT JOIN users_namespaces ON users_namespaces.namespace_id = namespaces.id
             LEFT JOIN team_namespaces ON team_namespaces.namespace_id = namespaces.id
             LEFT JOIN team_members ON team_members.team_id = team_namespaces.team_id
             WHERE (namespaces.owner_id = ?1 OR users_namespaces.user_id = ?1 OR team_members.user_id = ?1)
               AND namespaces.title LIKE ?2 ESCAPE '\\'
               AND (?3 OR namespaces.is_archived = 0)
             ORDER BY namespaces.id"
        ))?;

        let rows = stmt.query_map(
            params![user_id, like_pattern(search), include_archived],
            namespace_from_row,
        )?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}
