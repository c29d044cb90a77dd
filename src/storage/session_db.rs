use rusqlite::{Connection, OptionalExtension, Result as SqlResult, params};
use std::path::Path;

use super::ensure_parent_dir;

/// Key the bearer token is stored under.
pub const TOKEN_KEY: &str = "token";

/// Small key/value store for client session state (the bearer token).
pub struct SessionDatabase {
    conn: Connection,
}

impl SessionDatabase {
    /// Initialize session database at custom path
    pub fn with_path<P: AsRef<Path>>(path: P) -> SqlResult<Self> {
        if let Err(err) = ensure_parent_dir(&path) {
            log::warn!(
                "Unable to create directory for {}: {err}",
                path.as_ref().display()
            );
        }
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> SqlResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> SqlResult<Self> {
        let session_db = Self { conn };
        session_db.init_schema()?;
        Ok(session_db)
    }

    fn init_schema(&self) -> SqlResult<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS session (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
            )",
            [],
        )?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> SqlResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM session WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
    }

    pub fn set(&self, key: &str, value: &str) -> SqlResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO session (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now'))",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> SqlResult<()> {
        self.conn
            .execute("DELETE FROM session WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Stored bearer token. Read errors are logged and treated as "no token".
    pub fn token(&self) -> Option<String> {
        match self.get(TOKEN_KEY) {
            Ok(token) => token.filter(|token| !token.is_empty()),
            Err(err) => {
                log::error!("Failed to read session token: {err}");
                None
            }
        }
    }

    pub fn save_token(&self, token: &str) -> SqlResult<()> {
        self.set(TOKEN_KEY, token)
    }

    pub fn clear_token(&self) -> SqlResult<()> {
        self.remove(TOKEN_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_and_overwrite() {
        let sessions = SessionDatabase::in_memory().unwrap();
        assert_eq!(sessions.token(), None);

        sessions.save_token("first").unwrap();
        assert_eq!(sessions.token().as_deref(), Some("first"));

        sessions.save_token("second").unwrap();
        assert_eq!(sessions.token().as_deref(), Some("second"));

        sessions.clear_token().unwrap();
        assert_eq!(sessions.token(), None);
    }

    #[test]
    fn empty_token_reads_as_missing() {
        let sessions = SessionDatabase::in_memory().unwrap();
        sessions.save_token("").unwrap();
        assert_eq!(sessions.token(), None);
    }

    #[test]
    fn token_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.db");

        {
            let sessions = SessionDatabase::with_path(&path).unwrap();
            sessions.save_token("persisted").unwrap();
        }

        let sessions = SessionDatabase::with_path(&path).unwrap();
        assert_eq!(sessions.token().as_deref(), Some("persisted"));
    }
}
