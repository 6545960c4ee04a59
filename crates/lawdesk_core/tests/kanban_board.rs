use lawdesk_core::db::open_db_in_memory;
use lawdesk_core::model::kanban::{KanbanStatus, KanbanTask, Priority};
use lawdesk_core::repo::audit_repo::SqliteAuditRepository;
use lawdesk_core::repo::kanban_repo::SqliteKanbanRepository;
use lawdesk_core::service::audit_service::AuditLogger;
use lawdesk_core::service::kanban_service::{KanbanService, KanbanServiceError};
use lawdesk_core::EntityId;
use rusqlite::Connection;

fn service(conn: &Connection) -> KanbanService<SqliteKanbanRepository<'_>, SqliteAuditRepository<'_>> {
    KanbanService::new(
        SqliteKanbanRepository::try_new(conn).unwrap(),
        AuditLogger::new(SqliteAuditRepository::try_new(conn).unwrap(), None),
    )
}

fn column(
    service: &KanbanService<SqliteKanbanRepository<'_>, SqliteAuditRepository<'_>>,
    status: KanbanStatus,
) -> Vec<(EntityId, i64)> {
    service
        .board()
        .unwrap()
        .into_iter()
        .find(|column| column.status == status)
        .unwrap()
        .tasks
        .into_iter()
        .map(|task| (task.id, task.position))
        .collect()
}

#[test]
fn new_tasks_append_to_their_column() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let first = service
        .create_task(KanbanTask::new("Minutar contrato", KanbanStatus::Todo))
        .unwrap();
    let second = service
        .create_task(KanbanTask::new("Revisar proposta", KanbanStatus::Todo))
        .unwrap();
    let doing = service
        .create_task(KanbanTask::new("Protocolar", KanbanStatus::Doing))
        .unwrap();

    assert_eq!(first.position, 0);
    assert_eq!(second.position, 1);
    assert_eq!(doing.position, 0);

    let board = service.board().unwrap();
    assert_eq!(board.len(), 4);
    assert!(board[3].tasks.is_empty());
}

#[test]
fn move_renumbers_source_and_destination_densely() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let a = service.create_task(KanbanTask::new("A", KanbanStatus::Todo)).unwrap();
    let b = service.create_task(KanbanTask::new("B", KanbanStatus::Todo)).unwrap();
    let c = service.create_task(KanbanTask::new("C", KanbanStatus::Todo)).unwrap();
    let d = service.create_task(KanbanTask::new("D", KanbanStatus::Doing)).unwrap();

    let moved = service
        .move_task(b.id, KanbanStatus::Doing, Some(0))
        .unwrap();
    assert_eq!(moved.status, KanbanStatus::Doing);
    assert_eq!(moved.position, 0);

    assert_eq!(column(&service, KanbanStatus::Todo), vec![(a.id, 0), (c.id, 1)]);
    assert_eq!(column(&service, KanbanStatus::Doing), vec![(b.id, 0), (d.id, 1)]);
}

#[test]
fn move_within_column_and_past_the_end() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let a = service.create_task(KanbanTask::new("A", KanbanStatus::Todo)).unwrap();
    let b = service.create_task(KanbanTask::new("B", KanbanStatus::Todo)).unwrap();
    let c = service.create_task(KanbanTask::new("C", KanbanStatus::Todo)).unwrap();

    service.move_task(c.id, KanbanStatus::Todo, Some(0)).unwrap();
    assert_eq!(
        column(&service, KanbanStatus::Todo),
        vec![(c.id, 0), (a.id, 1), (b.id, 2)]
    );

    service.move_task(c.id, KanbanStatus::Todo, Some(99)).unwrap();
    assert_eq!(
        column(&service, KanbanStatus::Todo),
        vec![(a.id, 0), (b.id, 1), (c.id, 2)]
    );

    service.move_task(a.id, KanbanStatus::Done, None).unwrap();
    assert_eq!(column(&service, KanbanStatus::Todo), vec![(b.id, 0), (c.id, 1)]);
    assert_eq!(column(&service, KanbanStatus::Done), vec![(a.id, 0)]);
}

#[test]
fn delete_closes_the_gap() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let a = service.create_task(KanbanTask::new("A", KanbanStatus::Signature)).unwrap();
    let b = service.create_task(KanbanTask::new("B", KanbanStatus::Signature)).unwrap();
    let c = service.create_task(KanbanTask::new("C", KanbanStatus::Signature)).unwrap();

    service.delete_task(b.id).unwrap();
    assert_eq!(
        column(&service, KanbanStatus::Signature),
        vec![(a.id, 0), (c.id, 1)]
    );
    assert!(matches!(
        service.delete_task(b.id),
        Err(KanbanServiceError::TaskNotFound(_))
    ));
}

#[test]
fn update_keeps_column_and_position() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    service.create_task(KanbanTask::new("A", KanbanStatus::Todo)).unwrap();
    let mut task = service
        .create_task(KanbanTask::new("B", KanbanStatus::Todo))
        .unwrap();
    task.title = "  B revisado ".to_string();
    task.priority = Priority::High;
    task.due_date = Some("2026-04-30".to_string());
    service.update_task(task.clone()).unwrap();

    let loaded = service.get_task(task.id).unwrap();
    assert_eq!(loaded.title, "B revisado");
    assert_eq!(loaded.priority, Priority::High);
    assert_eq!(loaded.status, KanbanStatus::Todo);
    assert_eq!(loaded.position, 1);
}
