//! Client registry record.

use crate::model::validation::{check_digits, require_text, ValidationResult};
use crate::model::{clean_optional, EntityId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A client company or person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: EntityId,
    pub name: String,
    /// CNPJ for companies, CPF when `is_person` is set.
    pub cnpj: Option<String>,
    pub is_person: bool,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub city: Option<String>,
    pub uf: Option<String>,
    /// Responsible partner.
    pub partner_id: Option<EntityId>,
}

impl Client {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            cnpj: None,
            is_person: false,
            email: None,
            phone: None,
            address: None,
            number: None,
            complement: None,
            city: None,
            uf: None,
            partner_id: None,
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        require_text("client", "name", &self.name)?;
        let expected = if self.is_person { 11 } else { 14 };
        check_digits("client.cnpj", self.cnpj.as_deref(), expected)?;
        Ok(())
    }

    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.cnpj = clean_optional(self.cnpj);
        self.email = clean_optional(self.email);
        self.phone = clean_optional(self.phone);
        self.address = clean_optional(self.address);
        self.number = clean_optional(self.number);
        self.complement = clean_optional(self.complement);
        self.city = clean_optional(self.city);
        self.uf = clean_optional(self.uf).map(|uf| uf.to_uppercase());
        self
    }
}
