use chrono::NaiveDate;
use lawdesk_core::db::open_db_in_memory;
use lawdesk_core::model::client::Client;
use lawdesk_core::model::contract::{Clause, Contract, ContractStatus};
use lawdesk_core::model::partner::Partner;
use lawdesk_core::model::validation::ValidationError;
use lawdesk_core::repo::audit_repo::SqliteAuditRepository;
use lawdesk_core::repo::client_repo::{ClientRepository, SqliteClientRepository};
use lawdesk_core::repo::contract_repo::{
    ContractListQuery, ContractRepository, SqliteContractRepository,
};
use lawdesk_core::repo::partner_repo::{PartnerRepository, SqlitePartnerRepository};
use lawdesk_core::service::audit_service::AuditLogger;
use lawdesk_core::service::contract_service::{ContractService, ContractServiceError};
use lawdesk_core::RepoError;
use rusqlite::Connection;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

fn service(
    conn: &Connection,
) -> ContractService<SqliteContractRepository<'_>, SqliteAuditRepository<'_>> {
    ContractService::new(
        SqliteContractRepository::try_new(conn).unwrap(),
        AuditLogger::new(
            SqliteAuditRepository::try_new(conn).unwrap(),
            Some("ana.lima@example.com"),
        ),
    )
}

#[test]
fn create_assigns_increasing_sequence_and_stamps_status_date() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let first = service
        .create_contract(Contract::new("ACME SA", ContractStatus::Analysis), day(2))
        .unwrap();
    let second = service
        .create_contract(Contract::new("Beta Ltda", ContractStatus::Active), day(3))
        .unwrap();

    assert_eq!(first.seq_id, 1);
    assert_eq!(second.seq_id, 2);
    assert_eq!(first.prospect_date.as_deref(), Some("2026-03-02"));
    assert_eq!(second.contract_date.as_deref(), Some("2026-03-03"));

    let listed = service.list_contracts(&ContractListQuery::default()).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].seq_id, 2);

    let timeline = service.timeline(first.id).unwrap();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].old_status, None);
    assert_eq!(timeline[0].new_status, ContractStatus::Analysis);
}

#[test]
fn status_change_stamps_date_and_appends_timeline() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let contract = service
        .create_contract(Contract::new("ACME SA", ContractStatus::Analysis), day(2))
        .unwrap();

    let updated = service
        .change_status(contract.id, ContractStatus::Active, day(9))
        .unwrap();
    assert_eq!(updated.status, ContractStatus::Active);
    assert_eq!(updated.contract_date.as_deref(), Some("2026-03-09"));
    assert_eq!(updated.prospect_date.as_deref(), Some("2026-03-02"));

    let timeline = service.timeline(contract.id).unwrap();
    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline[1].old_status, Some(ContractStatus::Analysis));
    assert_eq!(timeline[1].new_status, ContractStatus::Active);
    assert_eq!(timeline[1].changed_by.as_deref(), Some("ana.lima@example.com"));
    assert_eq!(
        service.total_duration(contract.id).unwrap().as_deref(),
        Some("Mesmo dia")
    );
}

#[test]
fn changing_to_current_status_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let contract = service
        .create_contract(Contract::new("ACME SA", ContractStatus::Proposal), day(2))
        .unwrap();

    match service.change_status(contract.id, ContractStatus::Proposal, day(5)) {
        Err(ContractServiceError::StatusUnchanged(status)) => {
            assert_eq!(status, ContractStatus::Proposal)
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(service.timeline(contract.id).unwrap().len(), 1);
}

#[test]
fn recording_proposal_advances_only_from_analysis() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let repo = SqliteContractRepository::try_new(&conn).unwrap();

    let analysis = service
        .create_contract(Contract::new("ACME SA", ContractStatus::Analysis), day(2))
        .unwrap();
    let active = service
        .create_contract(Contract::new("Beta Ltda", ContractStatus::Active), day(2))
        .unwrap();

    repo.record_proposal(analysis.id, "PROP-2026-0001", "2026-03-04", None)
        .unwrap();
    repo.record_proposal(active.id, "PROP-2026-0002", "2026-03-04", None)
        .unwrap();

    let analysis = service.get_contract(analysis.id).unwrap();
    assert_eq!(analysis.status, ContractStatus::Proposal);
    assert_eq!(analysis.proposal_code.as_deref(), Some("PROP-2026-0001"));
    assert_eq!(analysis.proposal_date.as_deref(), Some("2026-03-04"));
    assert_eq!(service.timeline(analysis.id).unwrap().len(), 2);

    let active = service.get_contract(active.id).unwrap();
    assert_eq!(active.status, ContractStatus::Active);
    assert_eq!(active.proposal_code.as_deref(), Some("PROP-2026-0002"));
    assert_eq!(active.proposal_date, None);
    assert_eq!(service.timeline(active.id).unwrap().len(), 1);
}

#[test]
fn fees_survive_the_store() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let mut contract = Contract::new("ACME SA", ContractStatus::Analysis);
    contract.fees.pro_labore = Some(Clause::currency("15.000,00", "mensais"));
    contract.fees.final_success_percent = Some(Clause::percent("10", "do proveito econômico"));
    let created = service.create_contract(contract, day(2)).unwrap();

    let loaded = service.get_contract(created.id).unwrap();
    assert_eq!(loaded.fees, created.fees);
}

#[test]
fn volumetry_groups_by_status_and_partner() {
    let conn = open_db_in_memory().unwrap();
    let partners = SqlitePartnerRepository::try_new(&conn).unwrap();
    let service = service(&conn);

    let ana = Partner::new("Ana");
    partners.create_partner(&ana).unwrap();

    for status in [
        ContractStatus::Analysis,
        ContractStatus::Analysis,
        ContractStatus::Active,
    ] {
        let mut contract = Contract::new("ACME SA", status);
        contract.partner_id = Some(ana.id);
        service.create_contract(contract, day(2)).unwrap();
    }
    service
        .create_contract(Contract::new("Solo", ContractStatus::Analysis), day(2))
        .unwrap();

    let rows = service.volumetry().unwrap();
    let counts: Vec<(ContractStatus, Option<&str>, i64)> = rows
        .iter()
        .map(|row| (row.status, row.partner_name.as_deref(), row.count))
        .collect();
    assert_eq!(
        counts,
        vec![
            (ContractStatus::Active, Some("Ana"), 1),
            (ContractStatus::Analysis, None, 1),
            (ContractStatus::Analysis, Some("Ana"), 2),
        ]
    );
}

#[test]
fn deleting_contract_removes_its_timeline() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let contract = service
        .create_contract(Contract::new("ACME SA", ContractStatus::Analysis), day(2))
        .unwrap();
    service
        .change_status(contract.id, ContractStatus::Rejected, day(3))
        .unwrap();

    service.delete_contract(contract.id).unwrap();

    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM contract_timeline;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
    assert!(matches!(
        service.get_contract(contract.id),
        Err(ContractServiceError::ContractNotFound(_))
    ));
}

#[test]
fn person_client_contract_keeps_the_cpf() {
    let conn = open_db_in_memory().unwrap();
    let mut client = Client::new("Maria Souza");
    client.is_person = true;
    client.cnpj = Some("123.456.789-01".to_string());
    SqliteClientRepository::try_new(&conn)
        .unwrap()
        .create_client(&client)
        .unwrap();
    let service = service(&conn);

    let mut contract = Contract::new("", ContractStatus::Analysis);
    contract.fill_from_client(&client);
    let created = service.create_contract(contract, day(4)).unwrap();
    let stored = SqliteContractRepository::try_new(&conn)
        .unwrap()
        .get_contract(created.id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.client_id, Some(client.id));
    assert_eq!(stored.client_name, "Maria Souza");
    assert_eq!(stored.cnpj, client.cnpj);

    let mut malformed = Contract::new("Beta Ltda", ContractStatus::Analysis);
    malformed.cnpj = Some("123456789012".to_string());
    assert!(matches!(
        service.create_contract(malformed, day(4)),
        Err(ContractServiceError::Repo(RepoError::Validation(
            ValidationError::InvalidDocument { actual: 12, .. }
        )))
    ));
}
