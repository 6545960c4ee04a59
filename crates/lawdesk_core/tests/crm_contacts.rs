use lawdesk_core::db::open_db_in_memory;
use lawdesk_core::model::client::Client;
use lawdesk_core::model::crm::{CrmContact, CrmField, GiftHistoryEntry, GiftType};
use lawdesk_core::model::partner::Partner;
use lawdesk_core::model::validation::ValidationError;
use lawdesk_core::repo::audit_repo::SqliteAuditRepository;
use lawdesk_core::repo::client_repo::{ClientRepository, SqliteClientRepository};
use lawdesk_core::repo::crm_repo::SqliteCrmRepository;
use lawdesk_core::repo::partner_repo::{PartnerRepository, SqlitePartnerRepository};
use lawdesk_core::service::audit_service::AuditLogger;
use lawdesk_core::service::crm_service::{CrmService, CrmServiceError};
use lawdesk_core::RepoError;
use rusqlite::Connection;

type Service<'conn> = CrmService<SqliteCrmRepository<'conn>, SqliteAuditRepository<'conn>>;

fn service(conn: &Connection) -> Service<'_> {
    CrmService::new(
        SqliteCrmRepository::try_new(conn).unwrap(),
        AuditLogger::new(SqliteAuditRepository::try_new(conn).unwrap(), None),
    )
}

fn client_with_partner(conn: &Connection, name: &str) -> Client {
    let partner = Partner::new("Ana Lima");
    SqlitePartnerRepository::try_new(conn)
        .unwrap()
        .create_partner(&partner)
        .unwrap();
    let mut client = Client::new(name);
    client.partner_id = Some(partner.id);
    SqliteClientRepository::try_new(conn)
        .unwrap()
        .create_client(&client)
        .unwrap();
    client
}

fn complete_contact(client: &Client, name: &str) -> CrmContact {
    let mut contact = CrmContact::new(client.id, name);
    contact.role = Some("Diretor jurídico".to_string());
    contact.email = Some("diretoria@acme.com.br".to_string());
    contact.gift_type = Some(GiftType::Vip);
    contact.gift_quantity = 1;
    contact.zip_code = Some("20040-002".to_string());
    contact.address = Some("Av. Rio Branco".to_string());
    contact.address_number = Some("1".to_string());
    contact.neighborhood = Some("Centro".to_string());
    contact.city = Some("Rio de Janeiro".to_string());
    contact.uf = Some("rj".to_string());
    contact
}

#[test]
fn switching_main_contact_keeps_exactly_one() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let client = client_with_partner(&conn, "ACME SA");

    let mut first = complete_contact(&client, "Bruno");
    first.is_main_contact = true;
    let first = service.create_contact(first).unwrap();
    let second = service
        .create_contact(complete_contact(&client, "Carla"))
        .unwrap();

    service.set_main_contact(second.id).unwrap();

    let contacts = service.list_contacts(Some(client.id)).unwrap();
    let mains: Vec<_> = contacts
        .iter()
        .filter(|profile| profile.contact.is_main_contact)
        .collect();
    assert_eq!(mains.len(), 1);
    assert_eq!(mains[0].contact.id, second.id);
    assert_eq!(contacts[0].contact.id, second.id);
    assert_eq!(contacts[1].contact.id, first.id);

    let mut first = service.get_contact(first.id).unwrap().contact;
    first.is_main_contact = true;
    service.update_contact(first.clone()).unwrap();
    assert!(!service.get_contact(second.id).unwrap().contact.is_main_contact);
    assert!(service.get_contact(first.id).unwrap().contact.is_main_contact);
}

#[test]
fn other_gift_without_description_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let client = client_with_partner(&conn, "ACME SA");

    let mut contact = CrmContact::new(client.id, "Bruno");
    contact.gift_type = Some(GiftType::Other);
    contact.gift_other = Some("   ".to_string());
    assert!(matches!(
        service.create_contact(contact.clone()),
        Err(CrmServiceError::Repo(RepoError::Validation(
            ValidationError::MissingGiftDescription
        )))
    ));

    contact.gift_other = Some("Vinho".to_string());
    contact.gift_quantity = -1;
    assert!(matches!(
        service.create_contact(contact),
        Err(CrmServiceError::Repo(RepoError::Validation(
            ValidationError::NegativeQuantity { value: -1, .. }
        )))
    ));
}

#[test]
fn incomplete_report_skips_ignored_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let client = client_with_partner(&conn, "ACME SA");

    service
        .create_contact(complete_contact(&client, "Completo"))
        .unwrap();
    let mut partial = complete_contact(&client, "Parcial");
    partial.email = None;
    partial.neighborhood = None;
    let partial = service.create_contact(partial).unwrap();

    let report = service.incomplete_contacts().unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].profile.contact.id, partial.id);
    assert_eq!(
        report[0].missing,
        vec![CrmField::Neighborhood, CrmField::Email]
    );

    let ignored = service.ignore_missing_fields(partial.id).unwrap();
    assert_eq!(ignored.len(), 2);
    assert!(service.incomplete_contacts().unwrap().is_empty());
    assert!(service.ignore_missing_fields(partial.id).unwrap().is_empty());

    let stored = service.get_contact(partial.id).unwrap().contact;
    assert_eq!(stored.ignored_fields.len(), 2);
    assert!(stored.is_ignored(CrmField::Email));
}

#[test]
fn gift_history_appends_and_summary_counts() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let client = client_with_partner(&conn, "ACME SA");

    let vip = service
        .create_contact(complete_contact(&client, "Bruno"))
        .unwrap();
    service
        .create_contact(CrmContact::new(client.id, "Sem brinde"))
        .unwrap();

    let updated = service
        .record_gift(
            vip.id,
            GiftHistoryEntry {
                gift_type: "Brinde VIP".to_string(),
                date: "2025-12-15".to_string(),
                quantity: 2,
                notes: Some("Natal".to_string()),
            },
        )
        .unwrap();
    assert_eq!(updated.gift_history.len(), 1);
    let stored = service.get_contact(vip.id).unwrap().contact;
    assert_eq!(stored.gift_history, updated.gift_history);
    assert_eq!(stored.uf.as_deref(), Some("RJ"));

    let summary = service.summary().unwrap();
    assert_eq!(summary.total_contacts, 2);
    assert!(summary.by_gift_type.contains(&(Some(GiftType::Vip), 1)));
    assert!(summary.by_gift_type.contains(&(None, 1)));
    assert_eq!(summary.by_partner, vec![(Some("Ana Lima".to_string()), 2)]);
}

#[test]
fn deleting_client_removes_its_contacts() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let client = client_with_partner(&conn, "ACME SA");
    let contact = service
        .create_contact(complete_contact(&client, "Bruno"))
        .unwrap();

    SqliteClientRepository::try_new(&conn)
        .unwrap()
        .delete_client(client.id)
        .unwrap();

    assert!(service.list_contacts(None).unwrap().is_empty());
    assert!(matches!(
        service.get_contact(contact.id),
        Err(CrmServiceError::ContactNotFound(_))
    ));
}
