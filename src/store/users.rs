use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};

use super::{Session, format_datetime, is_unique_violation, like_pattern, parse_datetime, parse_optional_datetime};
use crate::error::{Error, Result};
use crate::types::{Team, TeamMember, Token, User, UserSettings};

pub(crate) const USER_COLUMNS: &str = "users.id, users.username, users.name, users.email, users.created, users.updated,
     users.email_reminders_enabled, users.discoverable_by_name, users.discoverable_by_email,
     users.overdue_tasks_reminders_enabled, users.avatar_provider";

/// Number of columns in `USER_COLUMNS`; joined columns start at this index.
pub(crate) const USER_COLUMN_COUNT: usize = 11;

pub(crate) fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        created: parse_datetime(&row.get::<_, String>(4)?),
        updated: parse_datetime(&row.get::<_, String>(5)?),
        settings: UserSettings {
            email_reminders_enabled: row.get(6)?,
            discoverable_by_name: row.get(7)?,
            discoverable_by_email: row.get(8)?,
            overdue_tasks_reminders_enabled: row.get(9)?,
            avatar_provider: row
                .get::<_, String>(10)?
                .parse()
                .unwrap_or_default(),
        },
    })
}

fn token_from_row(row: &Row<'_>) -> rusqlite::Result<Token> {
    Ok(Token {
        id: row.get(0)?,
        token_hash: row.get(1)?,
        token_lookup: row.get(2)?,
        is_admin: row.get(3)?,
        user_id: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        expires_at: parse_optional_datetime(row.get(6)?),
        last_used_at: parse_optional_datetime(row.get(7)?),
    })
}

fn team_from_row(row: &Row<'_>) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_by_id: row.get(3)?,
        members: Vec::new(),
        created: parse_datetime(&row.get::<_, String>(4)?),
        updated: parse_datetime(&row.get::<_, String>(5)?),
    })
}

impl Session<'_> {
    // User operations

    pub fn create_user(&self, username: &str, email: &str) -> Result<User> {
        let now = Utc::now();
        let result = self.conn().execute(
            "INSERT INTO users (username, name, email, created, updated) VALUES (?1, '', ?2, ?3, ?3)",
            params![username, email, format_datetime(&now)],
        );

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(Error::UsernameExists {
                    username: username.to_string(),
                });
            }
            Err(e) => return Err(Error::from(e)),
        }

        Ok(User {
            id: self.last_insert_rowid(),
            username: username.to_string(),
            name: String::new(),
            email: email.to_string(),
            created: now,
            updated: now,
            settings: UserSettings::default(),
        })
    }

    /// Stores the display name and every setting of `user`.
    pub fn update_user_settings(&self, user: &User) -> Result<bool> {
        let settings = &user.settings;
        let rows = self.conn().execute(
            "UPDATE users SET name = ?2, email_reminders_enabled = ?3, discoverable_by_name = ?4,
                    discoverable_by_email = ?5, overdue_tasks_reminders_enabled = ?6,
                    avatar_provider = ?7, updated = ?8
             WHERE id = ?1",
            params![
                user.id,
                user.name,
                settings.email_reminders_enabled,
                settings.discoverable_by_name,
                settings.discoverable_by_email,
                settings.overdue_tasks_reminders_enabled,
                settings.avatar_provider.as_str(),
                format_datetime(&user.updated),
            ],
        )?;
        Ok(rows > 0)
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                user_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                params![username],
                user_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    pub fn list_users(&self, search: &str, limit: i64, offset: i64) -> Result<Vec<User>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE username LIKE ?1 ESCAPE '\\'
             ORDER BY id LIMIT ?2 OFFSET ?3"
        ))?;

        let rows = stmt.query_map(params![like_pattern(search), limit, offset], user_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    pub fn delete_user(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Token operations

    pub fn create_token(&self, token: &Token) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO tokens (id, token_hash, token_lookup, is_admin, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                token.id,
                token.token_hash,
                token.token_lookup,
                token.is_admin,
                token.user_id,
                format_datetime(&token.created_at),
                token.expires_at.as_ref().map(format_datetime),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(Error::TokenLookupCollision),
            Err(e) => Err(Error::from(e)),
        }
    }

    pub fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>> {
        self.conn()
            .query_row(
                "SELECT id, token_hash, token_lookup, is_admin, user_id, created_at, expires_at, last_used_at
                 FROM tokens WHERE token_lookup = ?1",
                params![lookup],
                token_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    pub fn list_user_tokens(&self, user_id: i64) -> Result<Vec<Token>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, token_hash, token_lookup, is_admin, user_id, created_at, expires_at, last_used_at
             FROM tokens WHERE user_id = ?1 ORDER BY created_at DESC",
        )?;

        let rows = stmt.query_map(params![user_id], token_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    pub fn delete_token(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM tokens WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn update_token_last_used(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE tokens SET last_used_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(())
    }

    pub fn has_admin_token(&self) -> Result<bool> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM tokens WHERE is_admin = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // Team operations

    pub fn create_team(&self, team: &mut Team) -> Result<()> {
        let now = Utc::now();
        self.conn().execute(
            "INSERT INTO teams (name, description, created_by_id, created, updated)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![team.name, team.description, team.created_by_id, format_datetime(&now)],
        )?;
        team.id = self.last_insert_rowid();
        team.created = now;
        team.updated = now;
        Ok(())
    }

    pub fn get_team(&self, id: i64) -> Result<Option<Team>> {
        self.conn()
            .query_row(
                "SELECT id, name, description, created_by_id, created, updated FROM teams WHERE id = ?1",
                params![id],
                team_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    /// Teams the user is a member of.
    pub fn list_user_teams(&self, user_id: i64) -> Result<Vec<Team>> {
        let mut stmt = self.conn().prepare(
            "SELECT teams.id, teams.name, teams.description, teams.created_by_id, teams.created, teams.updated
             FROM teams INNER JOIN team_members ON team_members.team_id = teams.id
             WHERE team_members.user_id = ?1 ORDER BY teams.id",
        )?;

        let rows = stmt.query_map(params![user_id], team_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    pub fn delete_team(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM teams WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn add_team_member(&self, team_id: i64, user_id: i64, admin: bool) -> Result<TeamMember> {
        let now = Utc::now();
        self.conn().execute(
            "INSERT INTO team_members (team_id, user_id, admin, created) VALUES (?1, ?2, ?3, ?4)",
            params![team_id, user_id, admin, format_datetime(&now)],
        )?;
        Ok(TeamMember {
            id: self.last_insert_rowid(),
            team_id,
            user_id,
            username: String::new(),
            admin,
            created: now,
        })
    }

    pub fn remove_team_member(&self, team_id: i64, user_id: i64) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM team_members WHERE team_id = ?1 AND user_id = ?2",
            params![team_id, user_id],
        )?;
        Ok(rows > 0)
    }

    pub fn list_team_members(&self, team_id: i64) -> Result<Vec<TeamMember>> {
        let mut stmt = self.conn().prepare(
            "SELECT team_members.id, team_members.team_id, team_members.user_id, users.username,
                    team_members.admin, team_members.created
             FROM team_members INNER JOIN users ON users.id = team_members.user_id
             WHERE team_members.team_id = ?1 ORDER BY team_members.id",
        )?;

        let rows = stmt.query_map(params![team_id], |row| {
            Ok(TeamMember {
                id: row.get(0)?,
                team_id: row.get(1)?,
                user_id: row.get(2)?,
                username: row.get(3)?,
                admin: row.get(4)?,
                created: parse_datetime(&row.get::<_, String>(5)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    /// Returns `Some(is_admin)` when the user is a member of the team.
    pub fn team_membership(&self, team_id: i64, user_id: i64) -> Result<Option<bool>> {
        self.conn()
            .query_row(
                "SELECT admin FROM team_members WHERE team_id = ?1 AND user_id = ?2",
                params![team_id, user_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(Error::from)
    }
}
