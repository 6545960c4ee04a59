use chrono::NaiveDate;
use lawdesk_core::config::{FirmConfig, ProposalLayoutConfig};
use lawdesk_core::db::open_db_in_memory;
use lawdesk_core::model::contract::{Clause, Contract, ContractStatus};
use lawdesk_core::model::partner::Partner;
use lawdesk_core::repo::audit_repo::{AuditRepository, SqliteAuditRepository};
use lawdesk_core::repo::contract_repo::{ContractRepository, SqliteContractRepository};
use lawdesk_core::service::audit_service::AuditLogger;
use lawdesk_core::service::proposal_service::{ProposalService, RenderRequest};
use lawdesk_core::{ProposalError, ProposalForm};
use rusqlite::Connection;
use std::io::Read;
use uuid::Uuid;

type Service<'conn> =
    ProposalService<SqliteContractRepository<'conn>, SqliteAuditRepository<'conn>>;

fn service(conn: &Connection) -> Service<'_> {
    ProposalService::new(
        SqliteContractRepository::try_new(conn).unwrap(),
        AuditLogger::new(
            SqliteAuditRepository::try_new(conn).unwrap(),
            Some("ana.lima@example.com"),
        ),
        FirmConfig::default(),
        &ProposalLayoutConfig::default(),
    )
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
}

fn stored_contract(conn: &Connection) -> Contract {
    let repo = SqliteContractRepository::try_new(conn).unwrap();
    let mut contract = Contract::new("ACME Comércio Ltda", ContractStatus::Analysis);
    contract.cnpj = Some("12345678000190".to_string());
    contract.reference = Some("Ação de cobrança".to_string());
    contract.fees.pro_labore = Some(Clause::currency("15.000,00", "mensais"));
    contract.seq_id = repo.create_contract(&contract).unwrap();
    contract
}

fn document_xml(path: &std::path::Path) -> String {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    xml
}

#[test]
fn linked_render_writes_files_and_advances_contract() {
    let conn = open_db_in_memory().unwrap();
    let contract = stored_contract(&conn);
    let dir = tempfile::tempdir().unwrap();
    let docx_path = dir.path().join("out").join("proposta.docx");
    let preview_path = dir.path().join("proposta.html");

    let form = ProposalForm::default()
        .with_defaults_from(ProposalForm::from_contract(&contract, &[Partner::new("Ana Lima")]));
    let rendered = service(&conn)
        .render(&RenderRequest {
            form: &form,
            contract_id: Some(contract.id),
            docx_path: &docx_path,
            preview_path: Some(&preview_path),
            today: today(),
        })
        .unwrap();

    assert_eq!(rendered.code, "PROP-2026-0001");
    assert!(rendered.page_count >= 1);

    let bytes = std::fs::read(&docx_path).unwrap();
    assert_eq!(&bytes[..2], b"PK");
    let xml = document_xml(&docx_path);
    assert!(xml.contains("ACME Comércio Ltda"));
    assert!(xml.contains("12.345.678/0001-90"));
    assert!(xml.contains("PROP-2026-0001"));

    let html = std::fs::read_to_string(&preview_path).unwrap();
    assert!(html.contains("class=\"page\""));
    assert!(html.contains("ANA LIMA"));

    let repo = SqliteContractRepository::try_new(&conn).unwrap();
    let stored = repo.get_contract(contract.id).unwrap().unwrap();
    assert_eq!(stored.status, ContractStatus::Proposal);
    assert_eq!(stored.proposal_code.as_deref(), Some("PROP-2026-0001"));
    assert_eq!(stored.proposal_date.as_deref(), Some("2026-10-15"));
    let timeline = repo.list_timeline(contract.id).unwrap();
    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline[1].changed_by.as_deref(), Some("ana.lima@example.com"));

    let audit = SqliteAuditRepository::try_new(&conn)
        .unwrap()
        .list_entries(Some("propostas"), 5)
        .unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, "GENERATE");
    assert!(audit[0].details.info.contains("PROP-2026-0001"));
}

#[test]
fn rendering_again_reuses_the_stored_code() {
    let conn = open_db_in_memory().unwrap();
    let contract = stored_contract(&conn);
    let dir = tempfile::tempdir().unwrap();
    let docx_path = dir.path().join("proposta.docx");
    let service = service(&conn);
    let form = ProposalForm::default();

    let request = RenderRequest {
        form: &form,
        contract_id: Some(contract.id),
        docx_path: &docx_path,
        preview_path: None,
        today: today(),
    };
    let first = service.render(&request).unwrap();
    let second = service.render(&request).unwrap();
    assert_eq!(first.code, second.code);

    let timeline = SqliteContractRepository::try_new(&conn)
        .unwrap()
        .list_timeline(contract.id)
        .unwrap();
    assert_eq!(timeline.len(), 2);
}

#[test]
fn standalone_render_leaves_store_untouched() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let docx_path = dir.path().join("avulsa.docx");
    let form = ProposalForm {
        client_name: Some("Beta Serviços".to_string()),
        custom_body: Some("Prezados,\n\n**Proposta** ajustada.".to_string()),
        ..ProposalForm::default()
    };

    let rendered = service(&conn)
        .render(&RenderRequest {
            form: &form,
            contract_id: None,
            docx_path: &docx_path,
            preview_path: None,
            today: today(),
        })
        .unwrap();

    assert!(rendered.code.starts_with("PROP-2026-"));
    assert_eq!(rendered.preview_path, None);
    let xml = document_xml(&docx_path);
    assert!(xml.contains("Proposta"));
    assert!(!xml.contains("**"));

    let contracts: i64 = conn
        .query_row("SELECT COUNT(*) FROM contracts;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(contracts, 0);
}

#[test]
fn missing_contract_fails_before_writing() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let docx_path = dir.path().join("nunca.docx");
    let form = ProposalForm::default();

    let result = service(&conn).render(&RenderRequest {
        form: &form,
        contract_id: Some(Uuid::new_v4()),
        docx_path: &docx_path,
        preview_path: None,
        today: today(),
    });

    assert!(matches!(result, Err(ProposalError::ContractNotFound(_))));
    assert!(!docx_path.exists());
}
