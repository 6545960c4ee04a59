//! Kanban board task.

use crate::model::validation::{check_date, require_text, ValidationResult};
use crate::model::{clean_optional, EntityId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Board column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KanbanStatus {
    Todo,
    Doing,
    Signature,
    Done,
}

impl KanbanStatus {
    pub const ALL: [KanbanStatus; 4] = [Self::Todo, Self::Doing, Self::Signature, Self::Done];

    pub fn as_db(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Signature => "signature",
            Self::Done => "done",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_db() == value.trim())
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Todo => "A Fazer",
            Self::Doing => "Em Andamento",
            Self::Signature => "Aguardando Assinatura",
            Self::Done => "Concluído",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_db(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Baixa",
            Self::Medium => "Média",
            Self::High => "Alta",
        }
    }
}

/// A work item placed in one column at `position`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KanbanTask {
    pub id: EntityId,
    pub title: String,
    pub description: Option<String>,
    pub status: KanbanStatus,
    pub priority: Priority,
    pub due_date: Option<String>,
    pub contract_id: Option<EntityId>,
    /// Zero-based order inside the column.
    pub position: i64,
}

impl KanbanTask {
    pub fn new(title: impl Into<String>, status: KanbanStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            status,
            priority: Priority::default(),
            due_date: None,
            contract_id: None,
            position: 0,
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        require_text("kanban_task", "title", &self.title)?;
        check_date("kanban_task.due_date", self.due_date.as_deref())?;
        Ok(())
    }

    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = clean_optional(self.description);
        self.due_date = clean_optional(self.due_date);
        self
    }
}
