//! Collaborator (staff) registry record.

use crate::model::validation::{
    check_date, check_digits, require_text, ValidationError, ValidationResult,
};
use crate::model::{clean_optional, EntityId, Gender};
use crate::text::dates::{age_on, days_between, parse_iso_date};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    pub id: EntityId,
    pub name: String,
    /// Partner the collaborator reports to.
    pub partner_id: Option<EntityId>,
    /// Direct leader among collaborators.
    pub leader_id: Option<EntityId>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cpf: Option<String>,
    pub birthday: Option<String>,
    pub gender: Option<Gender>,
    pub role: Option<String>,
    pub area: Option<String>,
    pub hire_date: Option<String>,
    pub termination_date: Option<String>,
    pub oab_number: Option<String>,
    pub oab_state: Option<String>,
    pub active: bool,
}

impl Collaborator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            partner_id: None,
            leader_id: None,
            email: None,
            phone: None,
            cpf: None,
            birthday: None,
            gender: None,
            role: None,
            area: None,
            hire_date: None,
            termination_date: None,
            oab_number: None,
            oab_state: None,
            active: true,
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        require_text("collaborator", "name", &self.name)?;
        check_digits("collaborator.cpf", self.cpf.as_deref(), 11)?;
        check_date("collaborator.birthday", self.birthday.as_deref())?;
        let hired = check_date("collaborator.hire_date", self.hire_date.as_deref())?;
        let terminated = check_date(
            "collaborator.termination_date",
            self.termination_date.as_deref(),
        )?;
        if let (Some(hired), Some(terminated)) = (hired, terminated) {
            if terminated < hired {
                return Err(ValidationError::DateOrder {
                    earlier: "collaborator.hire_date",
                    later: "collaborator.termination_date",
                });
            }
        }
        if self.leader_id == Some(self.id) {
            return Err(ValidationError::SelfReference {
                field: "collaborator.leader_id",
            });
        }
        Ok(())
    }

    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.email = clean_optional(self.email);
        self.phone = clean_optional(self.phone);
        self.cpf = clean_optional(self.cpf);
        self.birthday = clean_optional(self.birthday);
        self.role = clean_optional(self.role);
        self.area = clean_optional(self.area);
        self.hire_date = clean_optional(self.hire_date);
        self.termination_date = clean_optional(self.termination_date);
        self.oab_number = clean_optional(self.oab_number);
        self.oab_state = clean_optional(self.oab_state).map(|uf| uf.to_uppercase());
        self
    }

    /// Age in whole years on `on`.
    pub fn age_on(&self, on: NaiveDate) -> Option<u32> {
        let birthday = parse_iso_date(self.birthday.as_deref()?)?;
        age_on(birthday, on)
    }

    /// Days worked between hire and termination (or `on` while still employed).
    pub fn tenure_days(&self, on: NaiveDate) -> Option<i64> {
        let hired = parse_iso_date(self.hire_date.as_deref()?)?;
        let until = self
            .termination_date
            .as_deref()
            .and_then(parse_iso_date)
            .unwrap_or(on);
        Some(days_between(hired, until))
    }
}

#[cfg(test)]
mod tests {
    use super::Collaborator;
    use crate::model::validation::ValidationError;
    use chrono::NaiveDate;

    #[test]
    fn termination_before_hire_is_rejected() {
        let mut collaborator = Collaborator::new("Ana");
        collaborator.hire_date = Some("2024-05-01".to_string());
        collaborator.termination_date = Some("2024-04-30".to_string());
        assert!(matches!(
            collaborator.validate(),
            Err(ValidationError::DateOrder { .. })
        ));
        collaborator.termination_date = Some("2024-05-01".to_string());
        assert!(collaborator.validate().is_ok());
    }

    #[test]
    fn age_and_tenure_use_reference_date() {
        let mut collaborator = Collaborator::new("Ana");
        collaborator.birthday = Some("1990-10-16".to_string());
        collaborator.hire_date = Some("2026-10-01".to_string());
        let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        assert_eq!(collaborator.age_on(today), Some(35));
        assert_eq!(collaborator.tenure_days(today), Some(14));
    }

    #[test]
    fn leader_cannot_be_self() {
        let mut collaborator = Collaborator::new("Ana");
        collaborator.leader_id = Some(collaborator.id);
        assert!(matches!(
            collaborator.validate(),
            Err(ValidationError::SelfReference { .. })
        ));
    }
}
