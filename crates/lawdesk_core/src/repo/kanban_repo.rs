//! Kanban task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist board tasks and their in-column order.
//!
//! # Invariants
//! - Positions inside a column are dense `0..n` after every write.
//! - Moves and deletes renumber affected columns inside one immediate transaction.

use crate::model::kanban::{KanbanStatus, KanbanTask, Priority};
use crate::model::EntityId;
use crate::repo::schema::{ensure_connection_ready, get_optional_uuid, get_uuid, parse_uuid, uuid_text};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const KANBAN_COLUMNS: [&str; 8] = [
    "id",
    "title",
    "description",
    "status",
    "priority",
    "due_date",
    "contract_id",
    "position",
];

const KANBAN_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    status,
    priority,
    due_date,
    contract_id,
    position
FROM kanban_tasks";

pub trait KanbanRepository {
    /// Appends the task to the end of its column; returns the assigned position.
    fn create_task(&self, task: &KanbanTask) -> RepoResult<i64>;
    /// Updates task content; column and position change only through `move_task`.
    fn update_task(&self, task: &KanbanTask) -> RepoResult<()>;
    fn get_task(&self, id: EntityId) -> RepoResult<Option<KanbanTask>>;
    /// Lists tasks in column order, then position.
    fn list_tasks(&self, status: Option<KanbanStatus>) -> RepoResult<Vec<KanbanTask>>;
    /// Moves a task to `target_index` of `to_status` (end when `None`).
    /// Returns the column the task left.
    fn move_task(
        &self,
        id: EntityId,
        to_status: KanbanStatus,
        target_index: Option<usize>,
    ) -> RepoResult<KanbanStatus>;
    fn delete_task(&self, id: EntityId) -> RepoResult<()>;
}

pub struct SqliteKanbanRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKanbanRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "kanban_tasks", &KANBAN_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl KanbanRepository for SqliteKanbanRepository<'_> {
    fn create_task(&self, task: &KanbanTask) -> RepoResult<i64> {
        task.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let position = column_ids(&tx, task.status)?.len() as i64;
        tx.execute(
            "INSERT INTO kanban_tasks (
                id, title, description, status, priority, due_date, contract_id, position
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                task.id.to_string(),
                task.title.as_str(),
                task.description.as_deref(),
                task.status.as_db(),
                task.priority.as_db(),
                task.due_date.as_deref(),
                uuid_text(task.contract_id),
                position,
            ],
        )?;
        tx.commit()?;

        Ok(position)
    }

    fn update_task(&self, task: &KanbanTask) -> RepoResult<()> {
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE kanban_tasks
             SET
                title = ?1,
                description = ?2,
                priority = ?3,
                due_date = ?4,
                contract_id = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?6;",
            params![
                task.title.as_str(),
                task.description.as_deref(),
                task.priority.as_db(),
                task.due_date.as_deref(),
                uuid_text(task.contract_id),
                task.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "kanban_task",
                id: task.id,
            });
        }

        Ok(())
    }

    fn get_task(&self, id: EntityId) -> RepoResult<Option<KanbanTask>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{KANBAN_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_tasks(&self, status: Option<KanbanStatus>) -> RepoResult<Vec<KanbanTask>> {
        let mut stmt = self.conn.prepare(&format!(
            "{KANBAN_SELECT_SQL}
             WHERE (?1 IS NULL OR status = ?1)
             ORDER BY CASE status
                 WHEN 'todo' THEN 0
                 WHEN 'doing' THEN 1
                 WHEN 'signature' THEN 2
                 ELSE 3
             END ASC, position ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([status.map(KanbanStatus::as_db)])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn move_task(
        &self,
        id: EntityId,
        to_status: KanbanStatus,
        target_index: Option<usize>,
    ) -> RepoResult<KanbanStatus> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let from_status = load_task_status(&tx, id)?;

        let mut destination = column_ids(&tx, to_status)?;
        destination.retain(|task_id| *task_id != id);
        let index = target_index
            .unwrap_or(destination.len())
            .min(destination.len());
        destination.insert(index, id);

        tx.execute(
            "UPDATE kanban_tasks
             SET status = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), to_status.as_db()],
        )?;
        renumber(&tx, &destination)?;

        if from_status != to_status {
            let source = column_ids(&tx, from_status)?;
            renumber(&tx, &source)?;
        }

        tx.commit()?;
        Ok(from_status)
    }

    fn delete_task(&self, id: EntityId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let status = load_task_status(&tx, id)?;
        tx.execute("DELETE FROM kanban_tasks WHERE id = ?1;", [id.to_string()])?;
        let remaining = column_ids(&tx, status)?;
        renumber(&tx, &remaining)?;
        tx.commit()?;
        Ok(())
    }
}

fn load_task_status(tx: &Transaction<'_>, id: EntityId) -> RepoResult<KanbanStatus> {
    let status: Option<String> = tx
        .query_row(
            "SELECT status FROM kanban_tasks WHERE id = ?1;",
            [id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    match status {
        Some(text) => parse_status(&text),
        None => Err(RepoError::NotFound {
            entity: "kanban_task",
            id,
        }),
    }
}

fn column_ids(tx: &Transaction<'_>, status: KanbanStatus) -> RepoResult<Vec<EntityId>> {
    let mut stmt = tx.prepare(
        "SELECT id
         FROM kanban_tasks
         WHERE status = ?1
         ORDER BY position ASC, created_at ASC, id ASC;",
    )?;
    let mut rows = stmt.query([status.as_db()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let text: String = row.get(0)?;
        ids.push(parse_uuid(&text, "kanban_tasks.id")?);
    }
    Ok(ids)
}

fn renumber(tx: &Transaction<'_>, ordered_ids: &[EntityId]) -> RepoResult<()> {
    for (index, id) in ordered_ids.iter().enumerate() {
        tx.execute(
            "UPDATE kanban_tasks
             SET position = ?2
             WHERE id = ?1;",
            params![id.to_string(), index as i64],
        )?;
    }
    Ok(())
}

fn parse_status(value: &str) -> RepoResult<KanbanStatus> {
    KanbanStatus::parse(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{value}` in kanban_tasks.status"))
    })
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<KanbanTask> {
    let status_text: String = row.get("status")?;
    let priority_text: String = row.get("priority")?;
    let priority = Priority::parse(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in kanban_tasks.priority"
        ))
    })?;
    Ok(KanbanTask {
        id: get_uuid(row, "id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: parse_status(&status_text)?,
        priority,
        due_date: row.get("due_date")?,
        contract_id: get_optional_uuid(row, "contract_id")?,
        position: row.get("position")?,
    })
}
