//! Audit trail writer.
//!
//! # Invariants
//! - `log_action` never fails its caller; store errors become `warn` log lines.

use crate::model::audit::{user_name_from_email, AuditDetails, AuditEntry, SYSTEM_ACTOR};
use crate::repo::audit_repo::{AuditRepository, NewAuditEntry};
use crate::repo::RepoResult;
use log::warn;

/// Writes audit entries on behalf of one acting user.
pub struct AuditLogger<A: AuditRepository> {
    repo: A,
    user_email: String,
}

impl<A: AuditRepository> AuditLogger<A> {
    /// `user_email` falls back to the system actor when absent or blank.
    pub fn new(repo: A, user_email: Option<&str>) -> Self {
        let user_email = user_email
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .unwrap_or(SYSTEM_ACTOR)
            .to_string();
        Self { repo, user_email }
    }

    pub fn user_email(&self) -> &str {
        &self.user_email
    }

    /// Records one action. Failures are logged and swallowed.
    pub fn log_action(&self, action: &str, module: &str, info: &str, page: Option<&str>) {
        let entry = NewAuditEntry {
            user_email: &self.user_email,
            action,
            module,
            details: AuditDetails {
                info: info.to_string(),
                user_name: user_name_from_email(&self.user_email),
                page: page.map(str::to_string),
            },
        };
        if let Err(err) = self.repo.insert_entry(&entry) {
            warn!("event=audit_write module=audit status=error action={action} target={module} error={err}");
        }
    }

    pub fn recent(&self, module: Option<&str>, limit: u32) -> RepoResult<Vec<AuditEntry>> {
        self.repo.list_entries(module, limit)
    }
}
