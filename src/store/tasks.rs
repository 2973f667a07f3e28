use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row, params};

use super::users::{USER_COLUMNS, user_from_row};
use super::{Session, format_datetime, like_pattern, parse_datetime, parse_optional_datetime};
use crate::error::{Error, Result};
use crate::types::{File, RelationKind, RepeatMode, Task, TaskAttachment, TaskRelation, User};

const TASK_COLUMNS: &str = "tasks.id, tasks.title, tasks.description, tasks.done, tasks.done_at,
     tasks.due_date, tasks.list_id, tasks.repeat_after, tasks.repeat_mode, tasks.priority,
     tasks.start_date, tasks.end_date, tasks.hex_color, tasks.percent_done, tasks.task_index,
     tasks.uid, tasks.bucket_id, tasks.position, tasks.created_by_id, tasks.created, tasks.updated";

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let repeat_mode: i64 = row.get(8)?;
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        done: row.get(3)?,
        done_at: parse_optional_datetime(row.get(4)?),
        due_date: parse_optional_datetime(row.get(5)?),
        list_id: row.get(6)?,
        repeat_after: row.get(7)?,
        repeat_mode: RepeatMode::try_from(repeat_mode).unwrap_or_default(),
        priority: row.get(9)?,
        start_date: parse_optional_datetime(row.get(10)?),
        end_date: parse_optional_datetime(row.get(11)?),
        hex_color: row.get(12)?,
        percent_done: row.get(13)?,
        index: row.get(14)?,
        uid: row.get(15)?,
        bucket_id: row.get(16)?,
        position: row.get(17)?,
        created_by_id: row.get(18)?,
        created: parse_datetime(&row.get::<_, String>(19)?),
        updated: parse_datetime(&row.get::<_, String>(20)?),
        ..Task::default()
    })
}

fn format_optional(dt: &Option<DateTime<Utc>>) -> Option<String> {
    dt.as_ref().map(format_datetime)
}

impl Session<'_> {
    pub fn create_task(&self, task: &mut Task) -> Result<()> {
        let now = Utc::now();
        self.conn().execute(
            "INSERT INTO tasks (title, description, done, done_at, due_date, list_id, repeat_after,
                                repeat_mode, priority, start_date, end_date, hex_color, percent_done,
                                task_index, uid, bucket_id, position, created_by_id, created, updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?19)",
            params![
                task.title,
                task.description,
                task.done,
                format_optional(&task.done_at),
                format_optional(&task.due_date),
                task.list_id,
                task.repeat_after,
                i64::from(task.repeat_mode),
                task.priority,
                format_optional(&task.start_date),
                format_optional(&task.end_date),
                task.hex_color,
                task.percent_done,
                task.index,
                task.uid,
                task.bucket_id,
                task.position,
                task.created_by_id,
                format_datetime(&now),
            ],
        )?;
        task.id = self.last_insert_rowid();
        task.created = now;
        task.updated = now;
        Ok(())
    }

    /// Loads the task row only; labels, assignees and reminders are loaded separately.
    pub fn get_task(&self, id: i64) -> Result<Option<Task>> {
        self.conn()
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                task_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    pub fn get_task_by_uid(&self, list_id: i64, uid: &str) -> Result<Option<Task>> {
        self.conn()
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE list_id = ?1 AND uid = ?2"),
                params![list_id, uid],
                task_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    pub fn update_task(&self, task: &mut Task) -> Result<()> {
        task.updated = Utc::now();
        self.conn().execute(
            "UPDATE tasks SET title = ?1, description = ?2, done = ?3, done_at = ?4, due_date = ?5,
                              list_id = ?6, repeat_after = ?7, repeat_mode = ?8, priority = ?9,
                              start_date = ?10, end_date = ?11, hex_color = ?12, percent_done = ?13,
                              task_index = ?14, bucket_id = ?15, position = ?16, updated = ?17
             WHERE id = ?18",
            params![
                task.title,
                task.description,
                task.done,
                format_optional(&task.done_at),
                format_optional(&task.due_date),
                task.list_id,
                task.repeat_after,
                i64::from(task.repeat_mode),
                task.priority,
                format_optional(&task.start_date),
                format_optional(&task.end_date),
                task.hex_color,
                task.percent_done,
                task.index,
                task.bucket_id,
                task.position,
                format_datetime(&task.updated),
                task.id,
            ],
        )?;
        Ok(())
    }

    pub fn delete_task(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn list_tasks(&self, list_id: i64, search: &str, limit: i64, offset: i64) -> Result<Vec<Task>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE list_id = ?1 AND title LIKE ?2 ESCAPE '\\'
             ORDER BY done, position, id LIMIT ?3 OFFSET ?4"
        ))?;

        let rows = stmt.query_map(
            params![list_id, like_pattern(search), limit, offset],
            task_from_row,
        )?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    pub fn count_tasks(&self, list_id: i64, search: &str) -> Result<i64> {
        self.conn()
            .query_row(
                "SELECT COUNT(*) FROM tasks WHERE list_id = ?1 AND title LIKE ?2 ESCAPE '\\'",
                params![list_id, like_pattern(search)],
                |row| row.get(0),
            )
            .map_err(Error::from)
    }

    pub fn next_task_index(&self, list_id: i64) -> Result<i64> {
        let max: Option<i64> = self.conn().query_row(
            "SELECT MAX(task_index) FROM tasks WHERE list_id = ?1",
            params![list_id],
            |row| row.get(0),
        )?;
        Ok(max.unwrap_or(0) + 1)
    }

    // Reminders

    pub fn set_task_reminders(&self, task_id: i64, reminders: &[DateTime<Utc>]) -> Result<()> {
        let conn = self.conn();
        conn.execute("DELETE FROM task_reminders WHERE task_id = ?1", params![task_id])?;
        let now = format_datetime(&Utc::now());
        let mut stmt = conn.prepare(
            "INSERT INTO task_reminders (task_id, reminder, created) VALUES (?1, ?2, ?3)",
        )?;
        for reminder in reminders {
            stmt.execute(params![task_id, format_datetime(reminder), now])?;
        }
        Ok(())
    }

    pub fn task_reminders(&self, task_id: i64) -> Result<Vec<DateTime<Utc>>> {
        let mut stmt = self.conn().prepare(
            "SELECT reminder FROM task_reminders WHERE task_id = ?1 ORDER BY reminder",
        )?;

        let rows = stmt.query_map(params![task_id], |row| {
            Ok(parse_datetime(&row.get::<_, String>(0)?))
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Assignees

    pub fn set_task_assignees(&self, task_id: i64, user_ids: &[i64]) -> Result<()> {
        let conn = self.conn();
        conn.execute("DELETE FROM task_assignees WHERE task_id = ?1", params![task_id])?;
        let now = format_datetime(&Utc::now());
        let mut stmt = conn.prepare(
            "INSERT OR IGNORE INTO task_assignees (task_id, user_id, created) VALUES (?1, ?2, ?3)",
        )?;
        for user_id in user_ids {
            stmt.execute(params![task_id, user_id, now])?;
        }
        Ok(())
    }

    pub fn task_assignees(&self, task_id: i64) -> Result<Vec<User>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {USER_COLUMNS}
             FROM users INNER JOIN task_assignees ON task_assignees.user_id = users.id
             WHERE task_assignees.task_id = ?1 ORDER BY users.id"
        ))?;

        let rows = stmt.query_map(params![task_id], user_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Relations

    pub fn create_task_relation(&self, relation: &TaskRelation) -> Result<()> {
        self.conn().execute(
            "INSERT INTO task_relations (task_id, other_task_id, relation_kind, created_by_id, created)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                relation.task_id,
                relation.other_task_id,
                relation.relation_kind.as_str(),
                relation.created_by_id,
                format_datetime(&relation.created),
            ],
        )?;
        Ok(())
    }

    pub fn task_relation_exists(&self, task_id: i64, other_task_id: i64, kind: RelationKind) -> Result<bool> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM task_relations
             WHERE task_id = ?1 AND other_task_id = ?2 AND relation_kind = ?3",
            params![task_id, other_task_id, kind.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn delete_task_relation(&self, task_id: i64, other_task_id: i64, kind: RelationKind) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM task_relations WHERE task_id = ?1 AND other_task_id = ?2 AND relation_kind = ?3",
            params![task_id, other_task_id, kind.as_str()],
        )?;
        Ok(rows > 0)
    }

    /// Related tasks of a task, paired with the kind of relation.
    pub fn related_tasks(&self, task_id: i64) -> Result<Vec<(RelationKind, Task)>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT task_relations.relation_kind, {TASK_COLUMNS} FROM task_relations
             INNER JOIN tasks ON tasks.id = task_relations.other_task_id
             WHERE task_relations.task_id = ?1 ORDER BY task_relations.id"
        ))?;

        let rows = stmt.query_map(params![task_id], |row| {
            let kind: String = row.get(0)?;
            // Shift the column offsets by one for the task columns.
            let task = Task {
                id: row.get(1)?,
                title: row.get(2)?,
                description: row.get(3)?,
                done: row.get(4)?,
                list_id: row.get(7)?,
                index: row.get(15)?,
                uid: row.get(16)?,
                bucket_id: row.get(17)?,
                created_by_id: row.get(19)?,
                created: parse_datetime(&row.get::<_, String>(20)?),
                updated: parse_datetime(&row.get::<_, String>(21)?),
                ..Task::default()
            };
            Ok((kind, task))
        })?;

        let mut related = Vec::new();
        for row in rows {
            let (kind, task) = row?;
            match kind.parse::<RelationKind>() {
                Ok(kind) => related.push((kind, task)),
                Err(_) => tracing::warn!("Ignoring unknown relation kind '{kind}' on task {task_id}"),
            }
        }
        Ok(related)
    }

    // Attachments

    pub fn create_task_attachment(&self, task_id: i64, file: &File, created_by_id: i64) -> Result<TaskAttachment> {
        let now = Utc::now();
        self.conn().execute(
            "INSERT INTO task_attachments (task_id, file_id, created_by_id, created) VALUES (?1, ?2, ?3, ?4)",
            params![task_id, file.id, created_by_id, format_datetime(&now)],
        )?;
        Ok(TaskAttachment {
            id: self.last_insert_rowid(),
            task_id,
            created_by_id,
            file: File {
                content: Vec::new(),
                ..file.clone()
            },
            created: now,
        })
    }

    pub fn task_attachments(&self, task_id: i64) -> Result<Vec<TaskAttachment>> {
        let mut stmt = self.conn().prepare(
            "SELECT task_attachments.id, task_attachments.task_id, task_attachments.created_by_id,
                    task_attachments.created, files.id, files.name, files.size, files.created_by_id, files.created
             FROM task_attachments INNER JOIN files ON files.id = task_attachments.file_id
             WHERE task_attachments.task_id = ?1 ORDER BY task_attachments.id",
        )?;

        let rows = stmt.query_map(params![task_id], |row| {
            Ok(TaskAttachment {
                id: row.get(0)?,
                task_id: row.get(1)?,
                created_by_id: row.get(2)?,
                created: parse_datetime(&row.get::<_, String>(3)?),
                file: File {
                    id: row.get(4)?,
                    name: row.get(5)?,
                    size: row.get(6)?,
                    created_by_id: row.get(7)?,
                    created: parse_datetime(&row.get::<_, String>(8)?),
                    content: Vec::new(),
                },
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}
