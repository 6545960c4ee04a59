//! Audit log repository contract and SQLite implementation.

use crate::model::audit::{AuditDetails, AuditEntry};
use crate::repo::schema::{ensure_connection_ready, get_json, to_json};
use crate::repo::RepoResult;
use rusqlite::{params, Connection, Row};

const AUDIT_COLUMNS: [&str; 6] = [
    "id",
    "user_email",
    "action",
    "module",
    "details",
    "created_at",
];

/// Insert payload; `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry<'a> {
    pub user_email: &'a str,
    pub action: &'a str,
    pub module: &'a str,
    pub details: AuditDetails,
}

pub trait AuditRepository {
    fn insert_entry(&self, entry: &NewAuditEntry<'_>) -> RepoResult<i64>;
    /// Newest entries first, optionally restricted to one module.
    fn list_entries(&self, module: Option<&str>, limit: u32) -> RepoResult<Vec<AuditEntry>>;
}

pub struct SqliteAuditRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuditRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "audit_logs", &AUDIT_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl AuditRepository for SqliteAuditRepository<'_> {
    fn insert_entry(&self, entry: &NewAuditEntry<'_>) -> RepoResult<i64> {
        let details = to_json(&entry.details, "audit_logs.details")?;
        self.conn.execute(
            "INSERT INTO audit_logs (user_email, action, module, details)
             VALUES (?1, ?2, ?3, ?4);",
            params![entry.user_email, entry.action, entry.module, details],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_entries(&self, module: Option<&str>, limit: u32) -> RepoResult<Vec<AuditEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_email, action, module, details, created_at
             FROM audit_logs
             WHERE (?1 IS NULL OR module = ?1)
             ORDER BY created_at DESC, id DESC
             LIMIT ?2;",
        )?;
        let mut rows = stmt.query(params![module, i64::from(limit)])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<AuditEntry> {
    Ok(AuditEntry {
        id: row.get("id")?,
        user_email: row.get("user_email")?,
        action: row.get("action")?,
        module: row.get("module")?,
        details: get_json(row, "details")?,
        created_at: row.get("created_at")?,
    })
}
