use lawdesk_core::db::open_db_in_memory;
use lawdesk_core::model::client::Client;
use lawdesk_core::model::collaborator::Collaborator;
use lawdesk_core::model::partner::Partner;
use lawdesk_core::model::validation::ValidationError;
use lawdesk_core::model::Gender;
use lawdesk_core::repo::audit_repo::{AuditRepository, SqliteAuditRepository};
use lawdesk_core::repo::client_repo::{ClientListQuery, ClientRepository, SqliteClientRepository};
use lawdesk_core::repo::collaborator_repo::{CollaboratorRepository, SqliteCollaboratorRepository};
use lawdesk_core::repo::partner_repo::{PartnerRepository, SqlitePartnerRepository};
use lawdesk_core::service::audit_service::AuditLogger;
use lawdesk_core::service::client_service::ClientService;
use lawdesk_core::RepoError;
use uuid::Uuid;

#[test]
fn partner_create_get_update_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePartnerRepository::try_new(&conn).unwrap();

    let mut partner = Partner::new("Ana Lima");
    partner.gender = Some(Gender::Female);
    partner.cpf = Some("12345678901".to_string());
    partner.oab_number = Some("123456".to_string());
    partner.oab_state = Some("RJ".to_string());
    let id = repo.create_partner(&partner).unwrap();

    let loaded = repo.get_partner(id).unwrap().unwrap();
    assert_eq!(loaded, partner);

    partner.active = false;
    partner.civil_status = Some("casada".to_string());
    repo.update_partner(&partner).unwrap();
    let loaded = repo.get_partner(id).unwrap().unwrap();
    assert!(!loaded.active);
    assert_eq!(loaded.civil_status.as_deref(), Some("casada"));

    assert!(repo.list_partners(true).unwrap().is_empty());
    assert_eq!(repo.list_partners(false).unwrap().len(), 1);
}

#[test]
fn partner_with_short_cpf_is_rejected_before_write() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePartnerRepository::try_new(&conn).unwrap();

    let mut partner = Partner::new("Carlos");
    partner.cpf = Some("123.456".to_string());
    match repo.create_partner(&partner) {
        Err(RepoError::Validation(ValidationError::InvalidDigits {
            expected, actual, ..
        })) => {
            assert_eq!(expected, 11);
            assert_eq!(actual, 6);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(repo.list_partners(false).unwrap().is_empty());
}

#[test]
fn update_missing_partner_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePartnerRepository::try_new(&conn).unwrap();

    let partner = Partner::new("Ghost");
    match repo.update_partner(&partner) {
        Err(RepoError::NotFound { entity, id }) => {
            assert_eq!(entity, "partner");
            assert_eq!(id, partner.id);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn deleting_partner_nulls_client_reference() {
    let conn = open_db_in_memory().unwrap();
    let partners = SqlitePartnerRepository::try_new(&conn).unwrap();
    let clients = SqliteClientRepository::try_new(&conn).unwrap();

    let partner = Partner::new("Ana");
    partners.create_partner(&partner).unwrap();
    let mut client = Client::new("Acme");
    client.partner_id = Some(partner.id);
    clients.create_client(&client).unwrap();

    partners.delete_partner(partner.id).unwrap();

    let loaded = clients.get_client(client.id).unwrap().unwrap();
    assert_eq!(loaded.partner_id, None);
}

#[test]
fn clients_are_searched_by_name_and_found_by_document() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteClientRepository::try_new(&conn).unwrap();

    let mut acme = Client::new("Acme Comércio");
    acme.cnpj = Some("12345678000190".to_string());
    repo.create_client(&acme).unwrap();
    repo.create_client(&Client::new("Beta_Serviços")).unwrap();
    repo.create_client(&Client::new("Gamma")).unwrap();

    let query = ClientListQuery {
        search: Some("acme".to_string()),
        ..ClientListQuery::default()
    };
    let found = repo.list_clients(&query).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, acme.id);

    let underscore = ClientListQuery {
        search: Some("_".to_string()),
        ..ClientListQuery::default()
    };
    let found = repo.list_clients(&underscore).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Beta_Serviços");

    let by_document = repo
        .find_client_by_document("12.345.678/0001-90")
        .unwrap()
        .unwrap();
    assert_eq!(by_document.id, acme.id);
    assert!(repo.find_client_by_document("").unwrap().is_none());
}

#[test]
fn client_service_writes_audit_entries() {
    let conn = open_db_in_memory().unwrap();
    let service = ClientService::new(
        SqliteClientRepository::try_new(&conn).unwrap(),
        AuditLogger::new(
            SqliteAuditRepository::try_new(&conn).unwrap(),
            Some("maria.souza@example.com"),
        ),
    );

    let client = service.create_client(Client::new("  Acme  ")).unwrap();
    assert_eq!(client.name, "Acme");
    service.delete_client(client.id).unwrap();

    let entries = SqliteAuditRepository::try_new(&conn)
        .unwrap()
        .list_entries(Some("clientes"), 10)
        .unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].action, "DELETE");
    assert_eq!(entries[1].action, "CREATE");
    assert_eq!(entries[1].details.info, "Criou cliente Acme");
    assert_eq!(entries[1].user_email, "maria.souza@example.com");

    match service.get_client(client.id) {
        Err(RepoError::NotFound { entity, .. }) => assert_eq!(entity, "client"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn collaborator_team_lists_direct_reports() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCollaboratorRepository::try_new(&conn).unwrap();

    let leader = Collaborator::new("Lia");
    repo.create_collaborator(&leader).unwrap();
    let mut report = Collaborator::new("Rui");
    report.leader_id = Some(leader.id);
    report.hire_date = Some("2024-02-01".to_string());
    repo.create_collaborator(&report).unwrap();
    repo.create_collaborator(&Collaborator::new("Solo")).unwrap();

    let team = repo.list_team(leader.id).unwrap();
    assert_eq!(team.len(), 1);
    assert_eq!(team[0].id, report.id);
    assert_eq!(team[0].hire_date.as_deref(), Some("2024-02-01"));
}

#[test]
fn collaborator_termination_before_hire_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCollaboratorRepository::try_new(&conn).unwrap();

    let mut collaborator = Collaborator::new("Rui");
    collaborator.hire_date = Some("2024-02-01".to_string());
    collaborator.termination_date = Some("2024-01-01".to_string());
    assert!(matches!(
        repo.create_collaborator(&collaborator),
        Err(RepoError::Validation(ValidationError::DateOrder { .. }))
    ));

    collaborator.termination_date = Some("2024-13-01".to_string());
    assert!(matches!(
        repo.create_collaborator(&collaborator),
        Err(RepoError::Validation(ValidationError::InvalidDate { .. }))
    ));
}

#[test]
fn deleting_missing_client_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteClientRepository::try_new(&conn).unwrap();
    assert!(matches!(
        repo.delete_client(Uuid::new_v4()),
        Err(RepoError::NotFound { entity: "client", .. })
    ));
}
