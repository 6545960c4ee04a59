//! Contract pipeline use-case service.
//!
//! # Responsibility
//! - Normalize and persist contracts through the repository.
//! - Drive status transitions and report pipeline durations.
//!
//! # Invariants
//! - A status change always stamps the new status' date and appends a timeline row.
//! - Changing to the current status is rejected.

use crate::model::contract::{Contract, ContractStatus, ContractTimelineEvent};
use crate::model::EntityId;
use crate::repo::audit_repo::AuditRepository;
use crate::repo::contract_repo::{
    ContractListQuery, ContractRepository, StatusChange, VolumetryRow,
};
use crate::repo::RepoError;
use crate::service::audit_service::AuditLogger;
use crate::text::dates::{duration_label, ISO_DATE_FORMAT};
use chrono::{DateTime, NaiveDate};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

const AUDIT_MODULE: &str = "contratos";

#[derive(Debug)]
pub enum ContractServiceError {
    ContractNotFound(EntityId),
    /// Contract is already in the requested status.
    StatusUnchanged(ContractStatus),
    Repo(RepoError),
}

impl Display for ContractServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContractNotFound(id) => write!(f, "contract not found: {id}"),
            Self::StatusUnchanged(status) => {
                write!(f, "contract is already in status `{}`", status.as_db())
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ContractServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ContractServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "contract",
                id,
            } => Self::ContractNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type ContractServiceResult<T> = Result<T, ContractServiceError>;

pub struct ContractService<R: ContractRepository, A: AuditRepository> {
    repo: R,
    audit: AuditLogger<A>,
}

impl<R: ContractRepository, A: AuditRepository> ContractService<R, A> {
    pub fn new(repo: R, audit: AuditLogger<A>) -> Self {
        Self { repo, audit }
    }

    /// Creates a contract and returns the stored copy with its `seq_id`.
    ///
    /// The current status' date defaults to `today` when not filled in.
    pub fn create_contract(
        &self,
        contract: Contract,
        today: NaiveDate,
    ) -> ContractServiceResult<Contract> {
        let mut contract = contract.normalized();
        if contract.date_for(contract.status).is_none() {
            contract.set_date_for(
                contract.status,
                Some(today.format(ISO_DATE_FORMAT).to_string()),
            );
        }
        contract.seq_id = self.repo.create_contract(&contract)?;
        info!(
            "event=contract_create module=contracts status=ok seq_id={} contract_status={}",
            contract.seq_id,
            contract.status.as_db()
        );
        self.audit.log_action(
            "CREATE",
            AUDIT_MODULE,
            &format!(
                "Criou contrato #{} para {}",
                contract.seq_id, contract.client_name
            ),
            Some("contracts"),
        );
        Ok(contract)
    }

    pub fn update_contract(&self, contract: Contract) -> ContractServiceResult<Contract> {
        let contract = contract.normalized();
        self.repo.update_contract(&contract)?;
        self.audit.log_action(
            "UPDATE",
            AUDIT_MODULE,
            &format!("Editou contrato #{}", contract.seq_id),
            Some("contracts"),
        );
        Ok(contract)
    }

    pub fn get_contract(&self, id: EntityId) -> ContractServiceResult<Contract> {
        self.repo
            .get_contract(id)?
            .ok_or(ContractServiceError::ContractNotFound(id))
    }

    pub fn list_contracts(&self, query: &ContractListQuery) -> ContractServiceResult<Vec<Contract>> {
        Ok(self.repo.list_contracts(query)?)
    }

    pub fn delete_contract(&self, id: EntityId) -> ContractServiceResult<()> {
        let contract = self.get_contract(id)?;
        self.repo.delete_contract(id)?;
        self.audit.log_action(
            "DELETE",
            AUDIT_MODULE,
            &format!(
                "Excluiu contrato #{} de {}",
                contract.seq_id, contract.client_name
            ),
            Some("contracts"),
        );
        Ok(())
    }

    /// Moves the contract to `new_status` dated `date`; returns the updated contract.
    pub fn change_status(
        &self,
        id: EntityId,
        new_status: ContractStatus,
        date: NaiveDate,
    ) -> ContractServiceResult<Contract> {
        let current = self.get_contract(id)?;
        if current.status == new_status {
            return Err(ContractServiceError::StatusUnchanged(new_status));
        }

        let date_text = date.format(ISO_DATE_FORMAT).to_string();
        let old_status = self.repo.change_status(&StatusChange {
            contract_id: id,
            new_status,
            date: &date_text,
            changed_by: Some(self.audit.user_email()),
        })?;
        info!(
            "event=contract_status module=contracts status=ok from={} to={}",
            old_status.as_db(),
            new_status.as_db()
        );
        self.audit.log_action(
            "UPDATE",
            AUDIT_MODULE,
            &format!(
                "Alterou status do contrato #{}: {} -> {}",
                current.seq_id,
                old_status.label(),
                new_status.label()
            ),
            Some("contracts"),
        );
        self.get_contract(id)
    }

    pub fn timeline(&self, id: EntityId) -> ContractServiceResult<Vec<ContractTimelineEvent>> {
        Ok(self.repo.list_timeline(id)?)
    }

    /// Label for the span between the first and last timeline events, if any.
    pub fn total_duration(&self, id: EntityId) -> ContractServiceResult<Option<String>> {
        let events = self.repo.list_timeline(id)?;
        Ok(timeline_duration(&events))
    }

    pub fn volumetry(&self) -> ContractServiceResult<Vec<VolumetryRow>> {
        Ok(self.repo.volumetry()?)
    }
}

/// `"Mesmo dia"` / `"N dias"` between the oldest and newest event.
pub fn timeline_duration(events: &[ContractTimelineEvent]) -> Option<String> {
    let first = events.iter().map(|event| event.changed_at).min()?;
    let last = events.iter().map(|event| event.changed_at).max()?;
    let start = DateTime::from_timestamp_millis(first)?.date_naive();
    let end = DateTime::from_timestamp_millis(last)?.date_naive();
    Some(duration_label(start, end))
}

#[cfg(test)]
mod tests {
    use super::timeline_duration;
    use crate::model::contract::{ContractStatus, ContractTimelineEvent};
    use uuid::Uuid;

    fn event(changed_at: i64) -> ContractTimelineEvent {
        ContractTimelineEvent {
            id: 0,
            contract_id: Uuid::nil(),
            old_status: None,
            new_status: ContractStatus::Analysis,
            changed_by: None,
            changed_at,
        }
    }

    #[test]
    fn duration_spans_oldest_to_newest_event() {
        const DAY_MS: i64 = 86_400_000;
        let base = 1_760_000_000_000;
        assert_eq!(timeline_duration(&[]), None);
        assert_eq!(
            timeline_duration(&[event(base)]),
            Some("Mesmo dia".to_string())
        );
        assert_eq!(
            timeline_duration(&[event(base + 10 * DAY_MS), event(base)]),
            Some("10 dias".to_string())
        );
    }
}
