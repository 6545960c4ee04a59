//! Back-office domain records.
//!
//! # Responsibility
//! - Mirror store tables 1:1 as plain records.
//! - Own save-time validation for required fields and document formats.
//!
//! # Invariants
//! - Every record is identified by a stable UUID v4 `EntityId`.
//! - Optional foreign keys reference other records by `EntityId`.

pub mod audit;
pub mod client;
pub mod collaborator;
pub mod contract;
pub mod crm;
pub mod kanban;
pub mod partner;
pub mod validation;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier shared by every registry record.
pub type EntityId = Uuid;

/// Grammatical gender used for Portuguese agreement in generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    pub fn as_db(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }

    /// Accepts the spellings found in legacy records (`F`, `Feminino`, `Female`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "m" | "masculino" | "male" => Some(Self::Male),
            "f" | "feminino" | "female" => Some(Self::Female),
            _ => None,
        }
    }

    pub fn is_female(self) -> bool {
        self == Self::Female
    }
}

/// Trims and drops blank optional text.
pub(crate) fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
