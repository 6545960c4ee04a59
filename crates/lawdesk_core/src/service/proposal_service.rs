//! Proposal rendering use-case service.
//!
//! # Responsibility
//! - Compose, paginate and write the proposal document and preview.
//! - Record the proposal code on the linked contract in one store write.
//!
//! # Invariants
//! - Files are written before the store is touched; a failed write leaves the
//!   contract unchanged.
//! - A linked contract in analysis moves to proposal; other statuses keep theirs.

use crate::config::{FirmConfig, ProposalLayoutConfig};
use crate::model::contract::Contract;
use crate::model::EntityId;
use crate::proposal::composer::compose;
use crate::proposal::docx::docx_bytes;
use crate::proposal::form::{proposal_code_for_contract, standalone_proposal_code, ProposalForm};
use crate::proposal::pagination::{paginate, total_pages, PageLayout};
use crate::proposal::preview::render_preview;
use crate::proposal::{ProposalError, ProposalResult};
use crate::repo::audit_repo::AuditRepository;
use crate::repo::contract_repo::ContractRepository;
use crate::service::audit_service::AuditLogger;
use crate::text::dates::ISO_DATE_FORMAT;
use chrono::NaiveDate;
use log::info;
use std::path::{Path, PathBuf};
use std::time::Instant;

const AUDIT_MODULE: &str = "propostas";

/// Where to write one rendered proposal.
#[derive(Debug, Clone)]
pub struct RenderRequest<'a> {
    pub form: &'a ProposalForm,
    pub contract_id: Option<EntityId>,
    pub docx_path: &'a Path,
    pub preview_path: Option<&'a Path>,
    pub today: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedProposal {
    pub code: String,
    pub page_count: usize,
    pub docx_path: PathBuf,
    pub preview_path: Option<PathBuf>,
}

pub struct ProposalService<R: ContractRepository, A: AuditRepository> {
    contracts: R,
    audit: AuditLogger<A>,
    firm: FirmConfig,
    layout: PageLayout,
}

impl<R: ContractRepository, A: AuditRepository> ProposalService<R, A> {
    pub fn new(
        contracts: R,
        audit: AuditLogger<A>,
        firm: FirmConfig,
        layout: &ProposalLayoutConfig,
    ) -> Self {
        Self {
            contracts,
            audit,
            firm,
            layout: PageLayout::from_config(layout),
        }
    }

    /// Renders the proposal files and records the code on the linked contract.
    pub fn render(&self, request: &RenderRequest<'_>) -> ProposalResult<RenderedProposal> {
        let started = Instant::now();
        let contract = match request.contract_id {
            Some(id) => Some(
                self.contracts
                    .get_contract(id)?
                    .ok_or(ProposalError::ContractNotFound(id))?,
            ),
            None => None,
        };

        let date = request.form.date.unwrap_or(request.today);
        let code = resolve_code(request.form, contract.as_ref(), date);
        let blocks = compose(request.form, &self.firm, &code, request.today);
        let pages = paginate(&self.layout, &blocks);

        let bytes = docx_bytes(&blocks, &self.firm)?;
        write_file(request.docx_path, &bytes)?;
        if let Some(path) = request.preview_path {
            let html = render_preview(&blocks, &pages, &self.layout, &self.firm);
            write_file(path, html.as_bytes())?;
        }

        if let Some(contract) = &contract {
            self.contracts.record_proposal(
                contract.id,
                &code,
                &date.format(ISO_DATE_FORMAT).to_string(),
                Some(self.audit.user_email()),
            )?;
        }

        let page_count = total_pages(&pages);
        info!(
            "event=proposal_render module=proposal status=ok pages={} blocks={} linked={} duration_ms={}",
            page_count,
            blocks.len(),
            contract.is_some(),
            started.elapsed().as_millis()
        );
        let client = request
            .form
            .client_name
            .as_deref()
            .or(contract.as_ref().map(|c| c.client_name.as_str()))
            .unwrap_or("cliente não informado");
        self.audit.log_action(
            "GENERATE",
            AUDIT_MODULE,
            &format!("Gerou proposta {code} para {client}"),
            Some("proposals"),
        );

        Ok(RenderedProposal {
            code,
            page_count,
            docx_path: request.docx_path.to_path_buf(),
            preview_path: request.preview_path.map(Path::to_path_buf),
        })
    }
}

/// Form code first, then the contract's stored code, then a fresh one.
fn resolve_code(form: &ProposalForm, contract: Option<&Contract>, date: NaiveDate) -> String {
    let typed = form
        .proposal_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty());
    if let Some(code) = typed {
        return code.to_string();
    }
    match contract {
        Some(contract) => contract
            .proposal_code
            .clone()
            .unwrap_or_else(|| proposal_code_for_contract(contract.seq_id, date)),
        None => standalone_proposal_code(date),
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> ProposalResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ProposalError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, bytes).map_err(|source| ProposalError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::resolve_code;
    use crate::model::contract::{Contract, ContractStatus};
    use crate::proposal::form::ProposalForm;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    #[test]
    fn typed_code_wins() {
        let form = ProposalForm {
            proposal_code: Some(" P-7 ".to_string()),
            ..ProposalForm::default()
        };
        assert_eq!(resolve_code(&form, None, date()), "P-7");
    }

    #[test]
    fn contract_code_is_reused_or_derived_from_sequence() {
        let mut contract = Contract::new("ACME", ContractStatus::Analysis);
        contract.seq_id = 12;
        let form = ProposalForm::default();
        assert_eq!(resolve_code(&form, Some(&contract), date()), "PROP-2026-0012");
        contract.proposal_code = Some("OLD-1".to_string());
        assert_eq!(resolve_code(&form, Some(&contract), date()), "OLD-1");
    }
}
