mod buckets;
mod files;
mod labels;
mod link_shares;
mod lists;
mod migration;
mod namespaces;
mod schema;
mod session;
mod sharing;
mod sqlite;
mod tasks;
mod users;

pub use session::Session;
pub use sharing::{ShareRow, ShareTable};
pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};

use crate::error::Result;

/// Store defines the database interface. Every read and write happens inside
/// a [`Session`], which is one database transaction.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    /// Opens a new transaction. Dropping the session without committing rolls back.
    fn session(&self) -> Result<Session<'_>>;
}

/// Runs `f` in a fresh session, committing when it returns `Ok` and rolling
/// back otherwise.
pub fn transact<S, T, F>(store: &S, f: F) -> Result<T>
where
    S: Store + ?Sized,
    F: FnOnce(&Session<'_>) -> Result<T>,
{
    let session = store.session()?;
    match f(&session) {
        Ok(value) => {
            session.commit()?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = session.rollback() {
                tracing::warn!("Failed to roll back session: {rollback_err}");
            }
            Err(e)
        }
    }
}

pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

pub(crate) fn parse_optional_datetime(s: Option<String>) -> Option<DateTime<Utc>> {
    s.filter(|s| !s.is_empty()).map(|s| parse_datetime(&s))
}

pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Whether `e` is a UNIQUE constraint failure. Foreign key and other
/// constraint failures do not count.
pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// Escapes a user supplied search term for a `LIKE ... ESCAPE '\'` clause.
pub(crate) fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
