use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, params};

use super::users::{USER_COLUMN_COUNT, USER_COLUMNS, user_from_row};
use super::{Session, format_datetime, is_unique_violation, like_pattern, parse_datetime};
use crate::error::{Error, Result};
use crate::types::{Right, Team, TeamWithRight, UserWithRight};

/// Names the table backing one kind of sharing relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareTable {
    pub table: &'static str,
    pub parent_column: &'static str,
    pub principal_column: &'static str,
}

impl ShareTable {
    pub const LIST_USERS: ShareTable = ShareTable {
        table: "users_lists",
        parent_column: "list_id",
        principal_column: "user_id",
    };
    pub const LIST_TEAMS: ShareTable = ShareTable {
        table: "team_lists",
        parent_column: "list_id",
        principal_column: "team_id",
    };
    pub const NAMESPACE_USERS: ShareTable = ShareTable {
        table: "users_namespaces",
        parent_column: "namespace_id",
        principal_column: "user_id",
    };
    pub const NAMESPACE_TEAMS: ShareTable = ShareTable {
        table: "team_namespaces",
        parent_column: "namespace_id",
        principal_column: "team_id",
    };

    fn is_team(self) -> bool {
        self.principal_column == "team_id"
    }

    fn already_has_access(self, parent_id: i64, principal_id: i64) -> Error {
        if self.is_team() {
            Error::TeamAlreadyHasAccess {
                team_id: principal_id,
                id: parent_id,
            }
        } else {
            Error::UserAlreadyHasAccess {
                user_id: principal_id,
                id: parent_id,
            }
        }
    }
}

/// One stored sharing relation.
#[derive(Debug, Clone)]
pub struct ShareRow {
    pub id: i64,
    pub parent_id: i64,
    pub principal_id: i64,
    pub right: Right,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Session<'_> {
    pub fn share_exists(&self, t: ShareTable, parent_id: i64, principal_id: i64) -> Result<bool> {
        let count: i64 = self.conn().query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE {} = ?1 AND {} = ?2",
                t.table, t.parent_column, t.principal_column
            ),
            params![parent_id, principal_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Inserts a relation. Callers check for an existing row first; a unique
    /// violation from a concurrent insert still maps to the "already has access" error.
    pub fn create_share(
        &self,
        t: ShareTable,
        parent_id: i64,
        principal_id: i64,
        right: Right,
    ) -> Result<ShareRow> {
        let now = Utc::now();
        let result = self.conn().execute(
            &format!(
                "INSERT INTO {} ({}, {}, access_right, created, updated) VALUES (?1, ?2, ?3, ?4, ?4)",
                t.table, t.parent_column, t.principal_column
            ),
            params![parent_id, principal_id, right.value(), format_datetime(&now)],
        );

        match result {
            Ok(_) => Ok(ShareRow {
                id: self.last_insert_rowid(),
                parent_id,
                principal_id,
                right,
                created: now,
                updated: now,
            }),
            Err(e) if is_unique_violation(&e) => Err(t.already_has_access(parent_id, principal_id)),
            Err(e) => Err(Error::from(e)),
        }
    }

    pub fn get_share(&self, t: ShareTable, parent_id: i64, principal_id: i64) -> Result<Option<ShareRow>> {
        self.conn()
            .query_row(
                &format!(
                    "SELECT id, {}, {}, access_right, created, updated FROM {} WHERE {} = ?1 AND {} = ?2",
                    t.parent_column, t.principal_column, t.table, t.parent_column, t.principal_column
                ),
                params![parent_id, principal_id],
                |row| {
                    Ok(ShareRow {
                        id: row.get(0)?,
                        parent_id: row.get(1)?,
                        principal_id: row.get(2)?,
                        right: Right::from(row.get::<_, i64>(3)?),
                        created: parse_datetime(&row.get::<_, String>(4)?),
                        updated: parse_datetime(&row.get::<_, String>(5)?),
                    })
                },
            )
            .optional()
            .map_err(Error::from)
    }

    /// Changes only the right of an existing relation.
    pub fn update_share_right(
        &self,
        t: ShareTable,
        parent_id: i64,
        principal_id: i64,
        right: Right,
    ) -> Result<bool> {
        let rows = self.conn().execute(
            &format!(
                "UPDATE {} SET access_right = ?1, updated = ?2 WHERE {} = ?3 AND {} = ?4",
                t.table, t.parent_column, t.principal_column
            ),
            params![right.value(), format_datetime(&Utc::now()), parent_id, principal_id],
        )?;
        Ok(rows > 0)
    }

    pub fn delete_share(&self, t: ShareTable, parent_id: i64, principal_id: i64) -> Result<bool> {
        let rows = self.conn().execute(
            &format!(
                "DELETE FROM {} WHERE {} = ?1 AND {} = ?2",
                t.table, t.parent_column, t.principal_column
            ),
            params![parent_id, principal_id],
        )?;
        Ok(rows > 0)
    }

    /// The right a user holds on the parent through the relation table. For
    /// team tables this is the highest right over all teams the user is in.
    pub fn share_right_for_user(&self, t: ShareTable, parent_id: i64, user_id: i64) -> Result<Option<Right>> {
        let sql = if t.is_team() {
            format!(
                "SELECT MAX(s.access_right) FROM {} AS s
                 INNER JOIN team_members ON team_members.team_id = s.team_id
                 WHERE s.{} = ?1 AND team_members.user_id = ?2",
                t.table, t.parent_column
            )
        } else {
            format!(
                "SELECT MAX(access_right) FROM {} WHERE {} = ?1 AND user_id = ?2",
                t.table, t.parent_column
            )
        };

        let right: Option<i64> = self
            .conn()
            .query_row(&sql, params![parent_id, user_id], |row| row.get(0))?;
        Ok(right.map(Right::from))
    }

    pub fn shared_users(
        &self,
        t: ShareTable,
        parent_id: i64,
        search: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserWithRight>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {USER_COLUMNS}, s.access_right
             FROM users INNER JOIN {} AS s ON s.user_id = users.id
             WHERE s.{} = ?1 AND users.username LIKE ?2 ESCAPE '\\'
             ORDER BY s.id LIMIT ?3 OFFSET ?4",
            t.table, t.parent_column
        ))?;

        let rows = stmt.query_map(
            params![parent_id, like_pattern(search), limit, offset],
            |row| {
                Ok(UserWithRight {
                    user: user_from_row(row)?,
                    right: Right::from(row.get::<_, i64>(USER_COLUMN_COUNT)?),
                })
            },
        )?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    pub fn count_shared_users(&self, t: ShareTable, parent_id: i64, search: &str) -> Result<i64> {
        self.conn()
            .query_row(
                &format!(
                    "SELECT COUNT(*) FROM users INNER JOIN {} AS s ON s.user_id = users.id
                     WHERE s.{} = ?1 AND users.username LIKE ?2 ESCAPE '\\'",
                    t.table, t.parent_column
                ),
                params![parent_id, like_pattern(search)],
                |row| row.get(0),
            )
            .map_err(Error::from)
    }

    pub fn shared_teams(
        &self,
        t: ShareTable,
        parent_id: i64,
        search: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TeamWithRight>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT teams.id, teams.name, teams.description, teams.created_by_id, teams.created, teams.updated,
                    s.access_right
             FROM teams INNER JOIN {} AS s ON s.team_id = teams.id
             WHERE s.{} = ?1 AND teams.name LIKE ?2 ESCAPE '\\'
             ORDER BY s.id LIMIT ?3 OFFSET ?4",
            t.table, t.parent_column
        ))?;

        let rows = stmt.query_map(
            params![parent_id, like_pattern(search), limit, offset],
            |row| {
                Ok(TeamWithRight {
                    team: Team {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        created_by_id: row.get(3)?,
                        members: Vec::new(),
                        created: parse_datetime(&row.get::<_, String>(4)?),
                        updated: parse_datetime(&row.get::<_, String>(5)?),
                    },
                    right: Right::from(row.get::<_, i64>(6)?),
                })
            },
        )?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    pub fn count_shared_teams(&self, t: ShareTable, parent_id: i64, search: &str) -> Result<i64> {
        self.conn()
            .query_row(
                &format!(
                    "SELECT COUNT(*) FROM teams INNER JOIN {} AS s ON s.team_id = teams.id
                     WHERE s.{} = ?1 AND teams.name LIKE ?2 ESCAPE '\\'",
                    t.table, t.parent_column
                ),
                params![parent_id, like_pattern(search)],
                |row| row.get(0),
            )
            .map_err(Error::from)
    }
}
