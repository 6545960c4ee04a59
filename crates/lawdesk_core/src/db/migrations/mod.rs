//! Schema migrations for the back-office store.
//!
//! Each step is one SQL file, numbered from 1 without gaps. The whole pending
//! range runs in a single transaction, so a failing step leaves the store at
//! its previous version.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Step {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: [Step; 4] = [
    Step {
        version: 1,
        name: "registries",
        sql: include_str!("0001_registries.sql"),
    },
    Step {
        version: 2,
        name: "contracts",
        sql: include_str!("0002_contracts.sql"),
    },
    Step {
        version: 3,
        name: "kanban_crm",
        sql: include_str!("0003_kanban_crm.sql"),
    },
    Step {
        version: 4,
        name: "audit_preferences",
        sql: include_str!("0004_audit_preferences.sql"),
    },
];

/// What one `apply_migrations` call changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: u32,
    pub to_version: u32,
    /// Names of the applied steps, oldest first.
    pub applied: Vec<&'static str>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    STEPS[STEPS.len() - 1].version
}

/// Brings the store up to `latest_version()`.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<MigrationReport> {
    let from_version = current_user_version(conn)?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let pending: Vec<&Step> = STEPS
        .iter()
        .filter(|step| step.version > from_version)
        .collect();
    if pending.is_empty() {
        return Ok(MigrationReport {
            from_version,
            to_version: from_version,
            applied: Vec::new(),
        });
    }

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        info!(
            "event=db_migrate module=db status=applied version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    Ok(MigrationReport {
        from_version,
        to_version: latest,
        applied: pending.iter().map(|step| step.name).collect(),
    })
}

pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version, STEPS};
    use rusqlite::Connection;

    #[test]
    fn steps_are_numbered_without_gaps() {
        for (index, step) in STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, index + 1, "step {}", step.name);
        }
    }

    #[test]
    fn second_run_applies_nothing() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();

        let first = apply_migrations(&mut conn).unwrap();
        assert_eq!(first.from_version, 0);
        assert_eq!(first.to_version, latest_version());
        assert_eq!(first.applied.first(), Some(&"registries"));
        assert_eq!(first.applied.len(), STEPS.len());

        let second = apply_migrations(&mut conn).unwrap();
        assert!(second.is_noop());
        assert_eq!(second.to_version, latest_version());
    }
}
