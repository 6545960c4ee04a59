//! Kanban board use-case service.

use crate::model::kanban::{KanbanStatus, KanbanTask};
use crate::model::EntityId;
use crate::repo::audit_repo::AuditRepository;
use crate::repo::kanban_repo::KanbanRepository;
use crate::repo::RepoError;
use crate::service::audit_service::AuditLogger;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

const AUDIT_MODULE: &str = "kanban";

#[derive(Debug)]
pub enum KanbanServiceError {
    TaskNotFound(EntityId),
    Repo(RepoError),
}

impl Display for KanbanServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(id) => write!(f, "kanban task not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for KanbanServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::TaskNotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for KanbanServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "kanban_task",
                id,
            } => Self::TaskNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type KanbanServiceResult<T> = Result<T, KanbanServiceError>;

/// One board column with its tasks in position order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardColumn {
    pub status: KanbanStatus,
    pub tasks: Vec<KanbanTask>,
}

pub struct KanbanService<R: KanbanRepository, A: AuditRepository> {
    repo: R,
    audit: AuditLogger<A>,
}

impl<R: KanbanRepository, A: AuditRepository> KanbanService<R, A> {
    pub fn new(repo: R, audit: AuditLogger<A>) -> Self {
        Self { repo, audit }
    }

    /// Adds the task at the end of its column.
    pub fn create_task(&self, task: KanbanTask) -> KanbanServiceResult<KanbanTask> {
        let mut task = task.normalized();
        task.position = self.repo.create_task(&task)?;
        self.audit.log_action(
            "CREATE",
            AUDIT_MODULE,
            &format!("Criou tarefa {}", task.title),
            Some("kanban"),
        );
        Ok(task)
    }

    pub fn update_task(&self, task: KanbanTask) -> KanbanServiceResult<KanbanTask> {
        let task = task.normalized();
        self.repo.update_task(&task)?;
        self.audit.log_action(
            "UPDATE",
            AUDIT_MODULE,
            &format!("Editou tarefa {}", task.title),
            Some("kanban"),
        );
        Ok(task)
    }

    pub fn get_task(&self, id: EntityId) -> KanbanServiceResult<KanbanTask> {
        self.repo
            .get_task(id)?
            .ok_or(KanbanServiceError::TaskNotFound(id))
    }

    /// Every column in board order, empty columns included.
    pub fn board(&self) -> KanbanServiceResult<Vec<BoardColumn>> {
        let tasks = self.repo.list_tasks(None)?;
        Ok(KanbanStatus::ALL
            .into_iter()
            .map(|status| BoardColumn {
                status,
                tasks: tasks
                    .iter()
                    .filter(|task| task.status == status)
                    .cloned()
                    .collect(),
            })
            .collect())
    }

    /// Moves a task and returns it with its new column and position.
    pub fn move_task(
        &self,
        id: EntityId,
        to_status: KanbanStatus,
        target_index: Option<usize>,
    ) -> KanbanServiceResult<KanbanTask> {
        let from_status = self.repo.move_task(id, to_status, target_index)?;
        let task = self.get_task(id)?;
        info!(
            "event=kanban_move module=kanban status=ok from={} to={} position={}",
            from_status.as_db(),
            to_status.as_db(),
            task.position
        );
        self.audit.log_action(
            "MOVE",
            AUDIT_MODULE,
            &format!(
                "Moveu tarefa {} de {} para {}",
                task.title,
                from_status.label(),
                to_status.label()
            ),
            Some("kanban"),
        );
        Ok(task)
    }

    pub fn delete_task(&self, id: EntityId) -> KanbanServiceResult<()> {
        let task = self.get_task(id)?;
        self.repo.delete_task(id)?;
        self.audit.log_action(
            "DELETE",
            AUDIT_MODULE,
            &format!("Excluiu tarefa {}", task.title),
            Some("kanban"),
        );
        Ok(())
    }
}
