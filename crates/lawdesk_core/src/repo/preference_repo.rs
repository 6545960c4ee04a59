//! Key/value preference storage.

use crate::repo::schema::ensure_connection_ready;
use crate::repo::RepoResult;
use rusqlite::{params, Connection, OptionalExtension};

/// Board/list toggle persisted between sessions.
pub const VIEW_MODE_KEY: &str = "view_mode";
/// `"true"` when the daily automatic backup is enabled.
pub const AUTO_BACKUP_ENABLED_KEY: &str = "auto_backup_enabled";
/// ISO date of the last automatic backup.
pub const LAST_BACKUP_DATE_KEY: &str = "last_backup_date";

pub trait PreferenceRepository {
    fn get_preference(&self, key: &str) -> RepoResult<Option<String>>;
    /// Inserts or replaces the value stored under `key`.
    fn set_preference(&self, key: &str, value: &str) -> RepoResult<()>;
    fn delete_preference(&self, key: &str) -> RepoResult<()>;

    fn get_flag(&self, key: &str) -> RepoResult<bool> {
        Ok(self.get_preference(key)?.as_deref() == Some("true"))
    }
}

pub struct SqlitePreferenceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePreferenceRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "preferences", &["key", "value"])?;
        Ok(Self { conn })
    }
}

impl PreferenceRepository for SqlitePreferenceRepository<'_> {
    fn get_preference(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1;",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_preference(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO preferences (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete_preference(&self, key: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM preferences WHERE key = ?1;", [key])?;
        Ok(())
    }
}
