//! Audit trail entry.

use serde::{Deserialize, Serialize};

/// Actor recorded when no user is signed in.
pub const SYSTEM_ACTOR: &str = "Sistema";

/// Free-form context stored as JSON next to an audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditDetails {
    pub info: String,
    pub user_name: String,
    pub page: Option<String>,
}

/// One user action, newest first when listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub user_email: String,
    /// Verb such as `CREATE`, `UPDATE`, `DELETE`, `MOVE`, `BACKUP`.
    pub action: String,
    pub module: String,
    pub details: AuditDetails,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// Display name derived from an e-mail: the part before `@`.
pub fn user_name_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

#[cfg(test)]
mod tests {
    use super::user_name_from_email;

    #[test]
    fn user_name_is_email_prefix() {
        assert_eq!(user_name_from_email("ana.souza@firm.com"), "ana.souza");
        assert_eq!(user_name_from_email("Sistema"), "Sistema");
    }
}
