//! CRM contact and gift tracking.
//!
//! # Responsibility
//! - Model relationship contacts attached to a client, with gift logistics.
//! - Report which registration fields are still missing.
//!
//! # Invariants
//! - `ignored_fields` holds `CrmField::label` values; ignored fields are never reported missing.
//! - Gift type `Outro` carries a non-blank `gift_other`.

use crate::model::validation::{require_text, ValidationError, ValidationResult};
use crate::model::{clean_optional, EntityId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GiftType {
    #[serde(rename = "Brinde VIP")]
    Vip,
    #[serde(rename = "Brinde Médio")]
    Standard,
    #[serde(rename = "Outro")]
    Other,
    #[serde(rename = "Não recebe")]
    None,
}

impl GiftType {
    pub const ALL: [GiftType; 4] = [Self::Vip, Self::Standard, Self::Other, Self::None];

    pub fn label(self) -> &'static str {
        match self {
            Self::Vip => "Brinde VIP",
            Self::Standard => "Brinde Médio",
            Self::Other => "Outro",
            Self::None => "Não recebe",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|gift| gift.label() == value.trim())
    }
}

/// One past gift delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftHistoryEntry {
    pub gift_type: String,
    pub date: String,
    pub quantity: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Registration fields checked by the incomplete-contact report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrmField {
    Name,
    Company,
    Role,
    GiftType,
    ZipCode,
    Address,
    Number,
    Neighborhood,
    City,
    Uf,
    Email,
    Partner,
}

impl CrmField {
    pub const ALL: [CrmField; 12] = [
        Self::Name,
        Self::Company,
        Self::Role,
        Self::GiftType,
        Self::ZipCode,
        Self::Address,
        Self::Number,
        Self::Neighborhood,
        Self::City,
        Self::Uf,
        Self::Email,
        Self::Partner,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Nome",
            Self::Company => "Empresa",
            Self::Role => "Cargo",
            Self::GiftType => "Tipo Brinde",
            Self::ZipCode => "CEP",
            Self::Address => "Endereço",
            Self::Number => "Número",
            Self::Neighborhood => "Bairro",
            Self::City => "Cidade",
            Self::Uf => "UF",
            Self::Email => "Email",
            Self::Partner => "Sócio",
        }
    }
}

/// A person at a client company the firm keeps in touch with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmContact {
    pub id: EntityId,
    pub client_id: EntityId,
    pub name: String,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_main_contact: bool,
    pub gift_type: Option<GiftType>,
    /// Free description required when `gift_type` is `Outro`.
    pub gift_other: Option<String>,
    pub gift_quantity: i64,
    pub gift_notes: Option<String>,
    pub gift_history: Vec<GiftHistoryEntry>,
    pub address: Option<String>,
    pub address_number: Option<String>,
    pub address_complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub uf: Option<String>,
    pub zip_code: Option<String>,
    pub ignored_fields: Vec<String>,
}

impl CrmContact {
    pub fn new(client_id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            name: name.into(),
            role: None,
            email: None,
            phone: None,
            is_main_contact: false,
            gift_type: None,
            gift_other: None,
            gift_quantity: 0,
            gift_notes: None,
            gift_history: Vec::new(),
            address: None,
            address_number: None,
            address_complement: None,
            neighborhood: None,
            city: None,
            uf: None,
            zip_code: None,
            ignored_fields: Vec::new(),
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        require_text("crm_contact", "name", &self.name)?;
        if self.gift_quantity < 0 {
            return Err(ValidationError::NegativeQuantity {
                field: "crm_contact.gift_quantity",
                value: self.gift_quantity,
            });
        }
        let other_blank = self
            .gift_other
            .as_deref()
            .map_or(true, |other| other.trim().is_empty());
        if self.gift_type == Some(GiftType::Other) && other_blank {
            return Err(ValidationError::MissingGiftDescription);
        }
        Ok(())
    }

    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.role = clean_optional(self.role);
        self.email = clean_optional(self.email);
        self.phone = clean_optional(self.phone);
        self.gift_other = clean_optional(self.gift_other);
        self.gift_notes = clean_optional(self.gift_notes);
        self.address = clean_optional(self.address);
        self.address_number = clean_optional(self.address_number);
        self.address_complement = clean_optional(self.address_complement);
        self.neighborhood = clean_optional(self.neighborhood);
        self.city = clean_optional(self.city);
        self.uf = clean_optional(self.uf).map(|uf| uf.to_uppercase());
        self.zip_code = clean_optional(self.zip_code);
        self
    }

    /// Fields still blank and not ignored.
    ///
    /// `company` and `partner_id` come from the linked client row.
    pub fn missing_fields(&self, company: Option<&str>, partner_id: Option<EntityId>) -> Vec<CrmField> {
        CrmField::ALL
            .into_iter()
            .filter(|field| {
                let present = match field {
                    CrmField::Name => !self.name.trim().is_empty(),
                    CrmField::Company => company.is_some_and(|name| !name.trim().is_empty()),
                    CrmField::Role => self.role.is_some(),
                    CrmField::GiftType => self.gift_type.is_some(),
                    CrmField::ZipCode => self.zip_code.is_some(),
                    CrmField::Address => self.address.is_some(),
                    CrmField::Number => self.address_number.is_some(),
                    CrmField::Neighborhood => self.neighborhood.is_some(),
                    CrmField::City => self.city.is_some(),
                    CrmField::Uf => self.uf.is_some(),
                    CrmField::Email => self.email.is_some(),
                    CrmField::Partner => partner_id.is_some(),
                };
                !present && !self.is_ignored(*field)
            })
            .collect()
    }

    pub fn is_ignored(&self, field: CrmField) -> bool {
        self.ignored_fields.iter().any(|label| label == field.label())
    }

    /// Adds `fields` to the ignore list, keeping existing entries and order.
    pub fn ignore(&mut self, fields: &[CrmField]) {
        for field in fields {
            if !self.is_ignored(*field) {
                self.ignored_fields.push(field.label().to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CrmContact, CrmField, GiftType};
    use crate::model::validation::ValidationError;
    use uuid::Uuid;

    #[test]
    fn other_gift_needs_description() {
        let mut contact = CrmContact::new(Uuid::new_v4(), "Maria");
        contact.gift_type = Some(GiftType::Other);
        assert_eq!(
            contact.validate(),
            Err(ValidationError::MissingGiftDescription)
        );
        contact.gift_other = Some("Vinho".to_string());
        assert!(contact.validate().is_ok());
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let mut contact = CrmContact::new(Uuid::new_v4(), "Maria");
        contact.gift_quantity = -1;
        assert!(matches!(
            contact.validate(),
            Err(ValidationError::NegativeQuantity { .. })
        ));
    }

    #[test]
    fn ignored_fields_drop_out_of_missing_list() {
        let mut contact = CrmContact::new(Uuid::new_v4(), "Maria");
        contact.email = Some("maria@acme.com".to_string());
        let missing = contact.missing_fields(Some("ACME"), None);
        assert!(missing.contains(&CrmField::Partner));
        assert!(!missing.contains(&CrmField::Email));
        assert!(!missing.contains(&CrmField::Company));

        contact.ignore(&missing);
        contact.ignore(&missing);
        assert_eq!(contact.ignored_fields.len(), missing.len());
        assert!(contact.missing_fields(Some("ACME"), None).is_empty());
    }

    #[test]
    fn gift_type_serializes_as_label() {
        let json = serde_json::to_string(&GiftType::Standard).unwrap();
        assert_eq!(json, "\"Brinde Médio\"");
        assert_eq!(GiftType::parse("Não recebe"), Some(GiftType::None));
    }
}
