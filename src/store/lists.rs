use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};

use super::{Session, format_datetime, like_pattern, parse_datetime};
use crate::error::{Error, Result};
use crate::types::List;

const LIST_COLUMNS: &str = "lists.id, lists.title, lists.description, lists.identifier, lists.hex_color,
     lists.namespace_id, lists.owner_id, lists.is_archived, lists.background_file_id, lists.position,
     lists.created, lists.updated";

fn list_from_row(row: &Row<'_>) -> rusqlite::Result<List> {
    Ok(List {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        identifier: row.get(3)?,
        hex_color: row.get(4)?,
        namespace_id: row.get(5)?,
        owner_id: row.get(6)?,
        is_archived: row.get(7)?,
        background_file_id: row.get(8)?,
        position: row.get(9)?,
        created: parse_datetime(&row.get::<_, String>(10)?),
        updated: parse_datetime(&row.get::<_, String>(11)?),
    })
}

impl Session<'_> {
    pub fn create_list(&self, list: &mut List) -> Result<()> {
        let now = Utc::now();
        self.conn().execute(
            "INSERT INTO lists (title, description, identifier, hex_color, namespace_id, owner_id,
                                is_archived, background_file_id, position, created, updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
            params![
                list.title,
                list.description,
                list.identifier,
                list.hex_color,
                list.namespace_id,
                list.owner_id,
                list.is_archived,
                list.background_file_id,
                list.position,
                format_datetime(&now),
            ],
        )?;
        list.id = self.last_insert_rowid();
        list.created = now;
        list.updated = now;
        Ok(())
    }

    pub fn get_list(&self, id: i64) -> Result<Option<List>> {
        self.conn()
            .query_row(
                &format!("SELECT {LIST_COLUMNS} FROM lists WHERE id = ?1"),
                params![id],
                list_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    /// Returns true when another list already uses the identifier.
    pub fn list_identifier_taken(&self, identifier: &str, except_list_id: i64) -> Result<bool> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM lists WHERE identifier = ?1 AND id != ?2",
            params![identifier, except_list_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn update_list(&self, list: &mut List) -> Result<()> {
        list.updated = Utc::now();
        self.conn().execute(
            "UPDATE lists SET title = ?1, description = ?2, identifier = ?3, hex_color = ?4,
                              namespace_id = ?5, is_archived = ?6, position = ?7, updated = ?8
             WHERE id = ?9",
            params![
                list.title,
                list.description,
                list.identifier,
                list.hex_color,
                list.namespace_id,
                list.is_archived,
                list.position,
                format_datetime(&list.updated),
                list.id,
            ],
        )?;
        Ok(())
    }

    pub fn delete_list(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM lists WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn touch_list(&self, id: i64) -> Result<()> {
        self.conn().execute(
            "UPDATE lists SET updated = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(())
    }

    pub fn set_list_background(&self, list_id: i64, file_id: i64) -> Result<()> {
        self.conn().execute(
            "UPDATE lists SET background_file_id = ?1, updated = ?2 WHERE id = ?3",
            params![file_id, format_datetime(&Utc::now()), list_id],
        )?;
        Ok(())
    }

    pub fn lists_in_namespace(&self, namespace_id: i64, include_archived: bool) -> Result<Vec<List>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {LIST_COLUMNS} FROM lists
             WHERE namespace_id = ?1 AND (?2 OR is_archived = 0)
             ORDER BY position, id"
        ))?;

        let rows = stmt.query_map(params![namespace_id, include_archived], list_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    /// Every list the user can read through ownership or any share.
    pub fn list_user_lists(
        &self,
        user_id: i64,
        search: &str,
        include_archived: bool,
    ) -> Result<Vec<List>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT DISTINCT {LIST_COLUMNS} FROM lists
             INNER JOIN namespaces ON namespaces.id = lists.namespace_id
             LEFT JOIN users_namespaces ON users_namespaces.namespace_id = namespaces.id
             LEFT JOIN team_namespaces ON team_namespaces.namespace_id = namespaces.id
             LEFT JOIN team_members AS ns_members ON ns_members.team_id = team_namespaces.team_id
             LEFT JOIN users_lists ON users_lists.list_id = lists.id
             LEFT JOIN team_lists ON team_lists.list_id = lists.id
             LEFT JOIN team_members AS list_members ON list_members.team_id = team_lists.team_id
             WHERE (namespaces.owner_id = ?1 OR lists.owner_id = ?1
                    OR users_namespaces.user_id = ?1 OR ns_members.user_id = ?1
                    OR users_lists.user_id = ?1 OR list_members.user_id = ?1)
               AND lists.title LIKE ?2 ESCAPE '\\'
               AND (?3 OR (lists.is_archived = 0 AND namespaces.is_archived = 0))
             ORDER BY lists.position, lists.id"
        ))?;

        let rows = stmt.query_map(
            params![user_id, like_pattern(search), include_archived],
            list_from_row,
        )?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    /// Lists shared with the user directly (user or team list share) whose
    /// namespace the user cannot otherwise reach.
    pub fn lists_shared_directly(&self, user_id: i64, include_archived: bool) -> Result<Vec<List>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT DISTINCT {LIST_COLUMNS} FROM lists
             INNER JOIN namespaces ON namespaces.id = lists.namespace_id
             LEFT JOIN users_lists ON users_lists.list_id = lists.id
             LEFT JOIN team_lists ON team_lists.list_id = lists.id
             LEFT JOIN team_members ON team_members.team_id = team_lists.team_id
             WHERE (users_lists.user_id = ?1 OR team_members.user_id = ?1)
               AND namespaces.owner_id != ?1
               AND lists.namespace_id NOT IN (
                   SELECT namespace_id FROM users_namespaces WHERE user_id = ?1
                   UNION
                   SELECT team_namespaces.namespace_id FROM team_namespaces
                   INNER JOIN team_members AS m ON m.team_id = team_namespaces.team_id
                   WHERE m.user_id = ?1)
               AND (?2 OR lists.is_archived = 0)
             ORDER BY lists.position, lists.id"
        ))?;

        let rows = stmt.query_map(params![user_id, include_archived], list_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}
