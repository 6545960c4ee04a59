//! Partner (sócio) registry record.

use crate::model::validation::{check_digits, require_text, ValidationResult};
use crate::model::{clean_optional, EntityId, Gender};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A signing partner of the firm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    pub id: EntityId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cpf: Option<String>,
    pub gender: Option<Gender>,
    /// Free text as recorded (`casado`, `solteira`, ...).
    pub civil_status: Option<String>,
    pub nationality: Option<String>,
    pub oab_number: Option<String>,
    pub oab_state: Option<String>,
    /// Inactive partners stay referenced by old records but are hidden from pickers.
    pub active: bool,
}

impl Partner {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: None,
            phone: None,
            cpf: None,
            gender: None,
            civil_status: None,
            nationality: None,
            oab_number: None,
            oab_state: None,
            active: true,
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        require_text("partner", "name", &self.name)?;
        check_digits("partner.cpf", self.cpf.as_deref(), 11)?;
        Ok(())
    }

    /// Trims text fields and drops blank optionals.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.email = clean_optional(self.email);
        self.phone = clean_optional(self.phone);
        self.cpf = clean_optional(self.cpf);
        self.civil_status = clean_optional(self.civil_status);
        self.nationality = clean_optional(self.nationality);
        self.oab_number = clean_optional(self.oab_number);
        self.oab_state = clean_optional(self.oab_state).map(|uf| uf.to_uppercase());
        self
    }
}
