//! JSON backup of the whole store.
//!
//! # Responsibility
//! - Dump every row of the backup table list into one `BackupData` document.
//! - Write dated backup files and run the once-a-day automatic backup.
//!
//! # Invariants
//! - A table that fails to read is backed up as an empty list and logged,
//!   never aborting the rest of the dump.
//! - The automatic backup runs at most once per calendar day.

use crate::db::DbError;
use crate::repo::audit_repo::AuditRepository;
use crate::repo::preference_repo::{
    PreferenceRepository, AUTO_BACKUP_ENABLED_KEY, LAST_BACKUP_DATE_KEY,
};
use crate::repo::RepoError;
use crate::service::audit_service::AuditLogger;
use crate::text::dates::ISO_DATE_FORMAT;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use log::{info, warn};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Tables included in a backup, parents before children.
pub const BACKUP_TABLES: [&str; 9] = [
    "partners",
    "clients",
    "collaborators",
    "contracts",
    "contract_timeline",
    "kanban_tasks",
    "crm_contacts",
    "audit_logs",
    "preferences",
];

pub const BACKUP_FORMAT_VERSION: &str = "1.0.0";

#[derive(Debug)]
pub enum BackupError {
    Db(DbError),
    Repo(RepoError),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Encode(serde_json::Error),
}

impl Display for BackupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Io { path, source } => {
                write!(f, "cannot write backup `{}`: {source}", path.display())
            }
            Self::Encode(err) => write!(f, "cannot encode backup: {err}"),
        }
    }
}

impl Error for BackupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<RepoError> for BackupError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for BackupError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Backup document as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupData {
    /// Local wall-clock time the dump was taken, `YYYY-MM-DDTHH:MM:SS`.
    pub timestamp: String,
    pub version: String,
    pub tables: BTreeMap<String, Vec<Map<String, Value>>>,
}

/// Result of an automatic backup check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoBackupOutcome {
    Disabled,
    /// Current hour is before the configured backup hour.
    TooEarly,
    AlreadyDoneToday,
    Written(PathBuf),
}

/// `lawdesk_backup_YYYY-MM-DD.json`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("lawdesk_backup_{}.json", date.format(ISO_DATE_FORMAT))
}

/// Reads every backup table. Unreadable tables become empty lists.
pub fn run_backup(conn: &Connection, now: NaiveDateTime) -> BackupData {
    let mut tables = BTreeMap::new();
    for table in BACKUP_TABLES {
        let rows = match dump_table(conn, table) {
            Ok(rows) => rows,
            Err(err) => {
                warn!("event=backup_table module=backup status=error table={table} error={err}");
                Vec::new()
            }
        };
        tables.insert(table.to_string(), rows);
    }
    BackupData {
        timestamp: now.format("%Y-%m-%dT%H:%M:%S").to_string(),
        version: BACKUP_FORMAT_VERSION.to_string(),
        tables,
    }
}

fn dump_table(conn: &Connection, table: &str) -> Result<Vec<Map<String, Value>>, BackupError> {
    let mut stmt = conn.prepare(&format!("SELECT * FROM {table};"))?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let mut rows = stmt.query([])?;
    let mut dumped = Vec::new();
    while let Some(row) = rows.next()? {
        let mut object = Map::with_capacity(columns.len());
        for (index, column) in columns.iter().enumerate() {
            object.insert(column.clone(), sql_value_to_json(row.get_ref(index)?));
        }
        dumped.push(object);
    }
    Ok(dumped)
}

fn sql_value_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(number) => Value::from(number),
        ValueRef::Real(number) => serde_json::Number::from_f64(number)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(bytes.iter().map(|b| format!("{b:02x}")).collect()),
    }
}

/// Writes backups and drives the automatic daily run.
pub struct BackupService<'conn, P: PreferenceRepository, A: AuditRepository> {
    conn: &'conn Connection,
    prefs: P,
    audit: AuditLogger<A>,
    auto_hour: u32,
}

impl<'conn, P: PreferenceRepository, A: AuditRepository> BackupService<'conn, P, A> {
    pub fn new(conn: &'conn Connection, prefs: P, audit: AuditLogger<A>, auto_hour: u32) -> Self {
        Self {
            conn,
            prefs,
            audit,
            auto_hour,
        }
    }

    /// Dumps the store to `dir/lawdesk_backup_<date>.json` and returns the path.
    pub fn write_backup(&self, dir: &Path, now: NaiveDateTime) -> Result<PathBuf, BackupError> {
        let started_at = Instant::now();
        let data = run_backup(self.conn, now);
        let encoded = serde_json::to_string_pretty(&data).map_err(BackupError::Encode)?;

        std::fs::create_dir_all(dir).map_err(|source| BackupError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(backup_file_name(now.date()));
        std::fs::write(&path, encoded).map_err(|source| BackupError::Io {
            path: path.clone(),
            source,
        })?;

        let row_count: usize = data.tables.values().map(Vec::len).sum();
        info!(
            "event=backup_write module=backup status=ok rows={row_count} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        self.audit.log_action(
            "BACKUP",
            "sistema",
            &format!("Gerou backup {}", backup_file_name(now.date())),
            Some("settings"),
        );
        Ok(path)
    }

    pub fn set_automatic_enabled(&self, enabled: bool) -> Result<(), BackupError> {
        self.prefs.set_preference(
            AUTO_BACKUP_ENABLED_KEY,
            if enabled { "true" } else { "false" },
        )?;
        Ok(())
    }

    /// Runs the daily backup when enabled, past the configured hour, and not yet done today.
    pub fn check_and_run_automatic_backup(
        &self,
        dir: &Path,
        now: NaiveDateTime,
    ) -> Result<AutoBackupOutcome, BackupError> {
        if !self.prefs.get_flag(AUTO_BACKUP_ENABLED_KEY)? {
            return Ok(AutoBackupOutcome::Disabled);
        }
        if now.hour() < self.auto_hour {
            return Ok(AutoBackupOutcome::TooEarly);
        }
        let today = now.date().format(ISO_DATE_FORMAT).to_string();
        if self.prefs.get_preference(LAST_BACKUP_DATE_KEY)?.as_deref() == Some(today.as_str()) {
            return Ok(AutoBackupOutcome::AlreadyDoneToday);
        }

        let path = self.write_backup(dir, now)?;
        self.prefs.set_preference(LAST_BACKUP_DATE_KEY, &today)?;
        Ok(AutoBackupOutcome::Written(path))
    }
}

#[cfg(test)]
mod tests {
    use super::{backup_file_name, sql_value_to_json};
    use chrono::NaiveDate;
    use rusqlite::types::ValueRef;
    use serde_json::json;

    #[test]
    fn file_name_carries_iso_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        assert_eq!(backup_file_name(date), "lawdesk_backup_2026-10-15.json");
    }

    #[test]
    fn sql_values_map_to_json() {
        assert_eq!(sql_value_to_json(ValueRef::Null), json!(null));
        assert_eq!(sql_value_to_json(ValueRef::Integer(7)), json!(7));
        assert_eq!(sql_value_to_json(ValueRef::Text(b"abc")), json!("abc"));
        assert_eq!(sql_value_to_json(ValueRef::Blob(&[0x0a, 0xff])), json!("0aff"));
    }
}
