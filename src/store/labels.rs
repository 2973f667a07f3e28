use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};

use super::{Session, format_datetime, like_pattern, parse_datetime};
use crate::error::{Error, Result};
use crate::types::Label;

const LABEL_COLUMNS: &str = "labels.id, labels.title, labels.description, labels.hex_color,
     labels.created_by_id, labels.created, labels.updated";

fn label_from_row(row: &Row<'_>) -> rusqlite::Result<Label> {
    Ok(Label {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        hex_color: row.get(3)?,
        created_by_id: row.get(4)?,
        created: parse_datetime(&row.get::<_, String>(5)?),
        updated: parse_datetime(&row.get::<_, String>(6)?),
    })
}

impl Session<'_> {
    pub fn create_label(&self, label: &mut Label) -> Result<()> {
        let now = Utc::now();
        self.conn().execute(
            "INSERT INTO labels (title, description, hex_color, created_by_id, created, updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                label.title,
                label.description,
                label.hex_color,
                label.created_by_id,
                format_datetime(&now),
            ],
        )?;
        label.id = self.last_insert_rowid();
        label.created = now;
        label.updated = now;
        Ok(())
    }

    pub fn get_label(&self, id: i64) -> Result<Option<Label>> {
        self.conn()
            .query_row(
                &format!("SELECT {LABEL_COLUMNS} FROM labels WHERE id = ?1"),
                params![id],
                label_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    pub fn update_label(&self, label: &mut Label) -> Result<()> {
        label.updated = Utc::now();
        self.conn().execute(
            "UPDATE labels SET title = ?1, description = ?2, hex_color = ?3, updated = ?4 WHERE id = ?5",
            params![
                label.title,
                label.description,
                label.hex_color,
                format_datetime(&label.updated),
                label.id,
            ],
        )?;
        Ok(())
    }

    pub fn delete_label(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM labels WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn labels_created_by(&self, user_id: i64, search: &str) -> Result<Vec<Label>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {LABEL_COLUMNS} FROM labels
             WHERE created_by_id = ?1 AND title LIKE ?2 ESCAPE '\\' ORDER BY id"
        ))?;

        let rows = stmt.query_map(params![user_id, like_pattern(search)], label_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    /// Labels attached to any task of the list.
    pub fn labels_on_list_tasks(&self, list_id: i64, search: &str) -> Result<Vec<Label>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT DISTINCT {LABEL_COLUMNS} FROM labels
             INNER JOIN label_tasks ON label_tasks.label_id = labels.id
             INNER JOIN tasks ON tasks.id = label_tasks.task_id
             WHERE tasks.list_id = ?1 AND labels.title LIKE ?2 ESCAPE '\\' ORDER BY labels.id"
        ))?;

        let rows = stmt.query_map(params![list_id, like_pattern(search)], label_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    /// Ids of the lists holding a task that carries the label.
    pub fn lists_with_label(&self, label_id: i64) -> Result<Vec<i64>> {
        let mut stmt = self.conn().prepare(
            "SELECT DISTINCT tasks.list_id FROM tasks
             INNER JOIN label_tasks ON label_tasks.task_id = tasks.id
             WHERE label_tasks.label_id = ?1",
        )?;

        let rows = stmt.query_map(params![label_id], |row| row.get(0))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Label-task relations

    pub fn label_is_on_task(&self, label_id: i64, task_id: i64) -> Result<bool> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM label_tasks WHERE label_id = ?1 AND task_id = ?2",
            params![label_id, task_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn add_label_to_task(&self, label_id: i64, task_id: i64) -> Result<i64> {
        self.conn().execute(
            "INSERT INTO label_tasks (task_id, label_id, created) VALUES (?1, ?2, ?3)",
            params![task_id, label_id, format_datetime(&Utc::now())],
        )?;
        Ok(self.last_insert_rowid())
    }

    pub fn remove_label_from_task(&self, label_id: i64, task_id: i64) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM label_tasks WHERE label_id = ?1 AND task_id = ?2",
            params![label_id, task_id],
        )?;
        Ok(rows > 0)
    }

    pub fn task_labels(&self, task_id: i64, search: &str) -> Result<Vec<Label>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {LABEL_COLUMNS} FROM labels
             INNER JOIN label_tasks ON label_tasks.label_id = labels.id
             WHERE label_tasks.task_id = ?1 AND labels.title LIKE ?2 ESCAPE '\\'
             ORDER BY label_tasks.id"
        ))?;

        let rows = stmt.query_map(params![task_id, like_pattern(search)], label_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}
