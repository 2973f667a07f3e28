use std::sync::MutexGuard;

use rusqlite::Connection;

use crate::error::Result;

/// An open transaction on the store's connection.
///
/// The connection stays locked for the lifetime of the session, so sessions
/// never interleave. Entity queries are implemented as methods on `Session`
/// in the sibling modules.
pub struct Session<'a> {
    conn: MutexGuard<'a, Connection>,
    open: bool,
}

impl<'a> Session<'a> {
    pub(super) fn begin(conn: MutexGuard<'a, Connection>) -> Result<Self> {
        conn.execute_batch("BEGIN")?;
        Ok(Self { conn, open: true })
    }

    pub fn commit(mut self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        self.open = false;
        Ok(())
    }

    pub fn rollback(mut self) -> Result<()> {
        self.conn.execute_batch("ROLLBACK")?;
        self.open = false;
        Ok(())
    }

    /// Returns the underlying connection for custom SQL inside this transaction.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn last_insert_rowid(&self) -> i64 {
        self.conn.last_insert_rowid()
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if self.open {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                tracing::warn!("Failed to roll back abandoned session: {e}");
            }
        }
    }
}
