use chrono::{NaiveDate, NaiveDateTime};
use lawdesk_core::db::open_db_in_memory;
use lawdesk_core::model::partner::Partner;
use lawdesk_core::repo::audit_repo::SqliteAuditRepository;
use lawdesk_core::repo::partner_repo::{PartnerRepository, SqlitePartnerRepository};
use lawdesk_core::repo::preference_repo::{
    PreferenceRepository, SqlitePreferenceRepository, LAST_BACKUP_DATE_KEY, VIEW_MODE_KEY,
};
use lawdesk_core::service::audit_service::AuditLogger;
use lawdesk_core::service::backup_service::{
    AutoBackupOutcome, BackupData, BackupService, BACKUP_FORMAT_VERSION, BACKUP_TABLES,
};
use rusqlite::Connection;

type Service<'conn> = BackupService<
    'conn,
    SqlitePreferenceRepository<'conn>,
    SqliteAuditRepository<'conn>,
>;

fn service(conn: &Connection) -> Service<'_> {
    BackupService::new(
        conn,
        SqlitePreferenceRepository::try_new(conn).unwrap(),
        AuditLogger::new(SqliteAuditRepository::try_new(conn).unwrap(), None),
        18,
    )
}

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, day)
        .unwrap()
        .and_hms_opt(hour, 30, 0)
        .unwrap()
}

#[test]
fn preferences_upsert_and_delete() {
    let conn = open_db_in_memory().unwrap();
    let prefs = SqlitePreferenceRepository::try_new(&conn).unwrap();

    assert_eq!(prefs.get_preference(VIEW_MODE_KEY).unwrap(), None);
    prefs.set_preference(VIEW_MODE_KEY, "board").unwrap();
    prefs.set_preference(VIEW_MODE_KEY, "list").unwrap();
    assert_eq!(
        prefs.get_preference(VIEW_MODE_KEY).unwrap().as_deref(),
        Some("list")
    );

    prefs.delete_preference(VIEW_MODE_KEY).unwrap();
    assert_eq!(prefs.get_preference(VIEW_MODE_KEY).unwrap(), None);
}

#[test]
fn backup_file_holds_every_table() {
    let conn = open_db_in_memory().unwrap();
    SqlitePartnerRepository::try_new(&conn)
        .unwrap()
        .create_partner(&Partner::new("Ana Lima"))
        .unwrap();
    let dir = tempfile::tempdir().unwrap();

    let path = service(&conn).write_backup(dir.path(), at(15, 9)).unwrap();
    assert_eq!(
        path.file_name().and_then(|name| name.to_str()),
        Some("lawdesk_backup_2026-10-15.json")
    );

    let data: BackupData =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(data.version, BACKUP_FORMAT_VERSION);
    assert_eq!(data.timestamp, "2026-10-15T09:30:00");
    assert_eq!(data.tables.len(), BACKUP_TABLES.len());
    let partners = &data.tables["partners"];
    assert_eq!(partners.len(), 1);
    assert_eq!(partners[0]["name"], "Ana Lima");
}

#[test]
fn automatic_backup_respects_flag_hour_and_day() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let dir = tempfile::tempdir().unwrap();

    assert_eq!(
        service
            .check_and_run_automatic_backup(dir.path(), at(15, 19))
            .unwrap(),
        AutoBackupOutcome::Disabled
    );

    service.set_automatic_enabled(true).unwrap();
    assert_eq!(
        service
            .check_and_run_automatic_backup(dir.path(), at(15, 17))
            .unwrap(),
        AutoBackupOutcome::TooEarly
    );

    let first = service
        .check_and_run_automatic_backup(dir.path(), at(15, 18))
        .unwrap();
    let expected = dir.path().join("lawdesk_backup_2026-10-15.json");
    assert_eq!(first, AutoBackupOutcome::Written(expected.clone()));
    assert!(expected.exists());

    assert_eq!(
        service
            .check_and_run_automatic_backup(dir.path(), at(15, 22))
            .unwrap(),
        AutoBackupOutcome::AlreadyDoneToday
    );

    let next_day = service
        .check_and_run_automatic_backup(dir.path(), at(16, 18))
        .unwrap();
    assert!(matches!(next_day, AutoBackupOutcome::Written(_)));

    let prefs = SqlitePreferenceRepository::try_new(&conn).unwrap();
    assert_eq!(
        prefs.get_preference(LAST_BACKUP_DATE_KEY).unwrap().as_deref(),
        Some("2026-10-16")
    );
}
