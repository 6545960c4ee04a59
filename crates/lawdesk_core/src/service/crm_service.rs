//! CRM contact use-case service.
//!
//! # Responsibility
//! - Persist contacts and gift deliveries.
//! - Build the incomplete-registration report and its "ignore" action.
//!
//! # Invariants
//! - Ignoring a contact's gaps only adds labels; it never clears existing ones.

use crate::model::crm::{CrmContact, CrmField, GiftHistoryEntry};
use crate::model::EntityId;
use crate::repo::audit_repo::AuditRepository;
use crate::repo::crm_repo::{CrmContactProfile, CrmRepository, CrmSummary};
use crate::repo::RepoError;
use crate::service::audit_service::AuditLogger;
use std::error::Error;
use std::fmt::{Display, Formatter};

const AUDIT_MODULE: &str = "crm";

#[derive(Debug)]
pub enum CrmServiceError {
    ContactNotFound(EntityId),
    Repo(RepoError),
}

impl Display for CrmServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContactNotFound(id) => write!(f, "crm contact not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CrmServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ContactNotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for CrmServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "crm_contact",
                id,
            } => Self::ContactNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type CrmServiceResult<T> = Result<T, CrmServiceError>;

/// Contact with registration gaps still to fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompleteContact {
    pub profile: CrmContactProfile,
    pub missing: Vec<CrmField>,
}

pub struct CrmService<R: CrmRepository, A: AuditRepository> {
    repo: R,
    audit: AuditLogger<A>,
}

impl<R: CrmRepository, A: AuditRepository> CrmService<R, A> {
    pub fn new(repo: R, audit: AuditLogger<A>) -> Self {
        Self { repo, audit }
    }

    pub fn create_contact(&self, contact: CrmContact) -> CrmServiceResult<CrmContact> {
        let contact = contact.normalized();
        self.repo.create_contact(&contact)?;
        self.audit.log_action(
            "CREATE",
            AUDIT_MODULE,
            &format!("Criou contato {}", contact.name),
            Some("crm"),
        );
        Ok(contact)
    }

    pub fn update_contact(&self, contact: CrmContact) -> CrmServiceResult<CrmContact> {
        let contact = contact.normalized();
        self.repo.update_contact(&contact)?;
        self.audit.log_action(
            "UPDATE",
            AUDIT_MODULE,
            &format!("Editou contato {}", contact.name),
            Some("crm"),
        );
        Ok(contact)
    }

    pub fn get_contact(&self, id: EntityId) -> CrmServiceResult<CrmContactProfile> {
        self.repo
            .get_contact(id)?
            .ok_or(CrmServiceError::ContactNotFound(id))
    }

    pub fn list_contacts(
        &self,
        client_id: Option<EntityId>,
    ) -> CrmServiceResult<Vec<CrmContactProfile>> {
        Ok(self.repo.list_contacts(client_id)?)
    }

    pub fn delete_contact(&self, id: EntityId) -> CrmServiceResult<()> {
        let profile = self.get_contact(id)?;
        self.repo.delete_contact(id)?;
        self.audit.log_action(
            "DELETE",
            AUDIT_MODULE,
            &format!("Excluiu contato {}", profile.contact.name),
            Some("crm"),
        );
        Ok(())
    }

    pub fn set_main_contact(&self, id: EntityId) -> CrmServiceResult<()> {
        self.repo.set_main_contact(id)?;
        Ok(())
    }

    /// Appends a delivery to the contact's gift history.
    pub fn record_gift(
        &self,
        id: EntityId,
        entry: GiftHistoryEntry,
    ) -> CrmServiceResult<CrmContact> {
        let mut contact = self.get_contact(id)?.contact;
        let info = format!("Registrou brinde {} para {}", entry.gift_type, contact.name);
        contact.gift_history.push(entry);
        self.repo.update_contact(&contact)?;
        self.audit
            .log_action("UPDATE", AUDIT_MODULE, &info, Some("crm"));
        Ok(contact)
    }

    pub fn summary(&self) -> CrmServiceResult<CrmSummary> {
        Ok(self.repo.summary()?)
    }

    /// Contacts with at least one missing, non-ignored field.
    pub fn incomplete_contacts(&self) -> CrmServiceResult<Vec<IncompleteContact>> {
        Ok(self
            .repo
            .list_contacts(None)?
            .into_iter()
            .filter_map(|profile| {
                let missing = missing_for(&profile);
                if missing.is_empty() {
                    None
                } else {
                    Some(IncompleteContact { profile, missing })
                }
            })
            .collect())
    }

    /// Marks every currently missing field of the contact as ignored.
    pub fn ignore_missing_fields(&self, id: EntityId) -> CrmServiceResult<Vec<CrmField>> {
        let mut profile = self.get_contact(id)?;
        let missing = missing_for(&profile);
        if missing.is_empty() {
            return Ok(missing);
        }
        profile.contact.ignore(&missing);
        self.repo
            .set_ignored_fields(id, &profile.contact.ignored_fields)?;
        self.audit.log_action(
            "UPDATE",
            AUDIT_MODULE,
            &format!(
                "Ignorou pendências de {}: {}",
                profile.contact.name,
                missing
                    .iter()
                    .map(|field| field.label())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Some("crm"),
        );
        Ok(missing)
    }
}

fn missing_for(profile: &CrmContactProfile) -> Vec<CrmField> {
    profile
        .contact
        .missing_fields(Some(&profile.client_name), profile.partner_id)
}
