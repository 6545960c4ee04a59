//! Proposal input form and signing-partner qualification.

use crate::model::contract::{Contract, ContractFees};
use crate::model::partner::Partner;
use crate::model::Gender;
use crate::text::masks::mask_cpf_or_cnpj;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A partner as printed in the proposal signature and qualification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningPartner {
    pub name: String,
    pub gender: Gender,
    pub civil_status: String,
    pub nationality: String,
    pub oab_number: String,
    pub oab_state: String,
    pub cpf: String,
}

impl Default for SigningPartner {
    fn default() -> Self {
        Self {
            name: "[incluir nome do sócio]".to_string(),
            gender: Gender::Male,
            civil_status: "casado".to_string(),
            nationality: "brasileiro".to_string(),
            oab_number: "XXXXXX".to_string(),
            oab_state: "RJ".to_string(),
            cpf: "XXX.XXX.XXX-XX".to_string(),
        }
    }
}

impl SigningPartner {
    /// Fills missing registry fields with the printed placeholders.
    pub fn from_partner(partner: &Partner) -> Self {
        let fallback = Self::default();
        Self {
            name: partner.name.clone(),
            gender: partner.gender.unwrap_or(Gender::Male),
            civil_status: partner.civil_status.clone().unwrap_or(fallback.civil_status),
            nationality: partner.nationality.clone().unwrap_or(fallback.nationality),
            oab_number: partner.oab_number.clone().unwrap_or(fallback.oab_number),
            oab_state: partner.oab_state.clone().unwrap_or(fallback.oab_state),
            cpf: partner
                .cpf
                .as_deref()
                .map(mask_cpf_or_cnpj)
                .unwrap_or(fallback.cpf),
        }
    }

    pub fn nationality_text(&self) -> String {
        let nationality = self.nationality.trim().to_lowercase();
        if self.gender.is_female() && nationality.contains("brasileir") {
            "brasileira".to_string()
        } else {
            nationality
        }
    }

    pub fn civil_status_text(&self) -> String {
        let civil = self.civil_status.trim().to_lowercase();
        if !self.gender.is_female() {
            return civil;
        }
        const FEMININE: [(&str, &str); 5] = [
            ("casad", "casada"),
            ("solteir", "solteira"),
            ("divorciad", "divorciada"),
            ("separad", "separada"),
            ("viúv", "viúva"),
        ];
        FEMININE
            .iter()
            .find(|(stem, _)| civil.contains(stem))
            .map(|(_, feminine)| feminine.to_string())
            .unwrap_or(civil)
    }

    /// `, brasileira, casada, advogada, inscrita na OAB/RJ sob o nº X, portadora do CPF/MF nº Y`
    ///
    /// The upper-cased name is printed separately, in bold, before this text.
    pub fn qualification(&self) -> String {
        let female = self.gender.is_female();
        format!(
            ", {}, {}, {}, {} na OAB/{} sob o nº {}, {} do CPF/MF nº {}",
            self.nationality_text(),
            self.civil_status_text(),
            if female { "advogada" } else { "advogado" },
            if female { "inscrita" } else { "inscrito" },
            self.oab_state,
            self.oab_number,
            if female { "portadora" } else { "portador" },
            self.cpf,
        )
    }
}

/// Everything the composer needs to draft one proposal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProposalForm {
    pub client_name: Option<String>,
    pub cnpj: Option<String>,
    pub reference: Option<String>,
    /// Object of the dispute, printed in clause 1.1.
    pub dispute_object: Option<String>,
    /// City for the date line; the firm default applies when absent.
    pub location: Option<String>,
    /// Date printed in the date line; the render date applies when absent.
    pub date: Option<NaiveDate>,
    /// Signing partners; a placeholder partner is printed when empty.
    pub partners: Vec<SigningPartner>,
    pub fees: ContractFees,
    /// Hand-edited body replacing the synthesized paragraphs.
    pub custom_body: Option<String>,
    pub proposal_code: Option<String>,
}

impl ProposalForm {
    /// Pre-fills the form from a stored contract and its signing partners.
    pub fn from_contract(contract: &Contract, partners: &[Partner]) -> Self {
        Self {
            client_name: Some(contract.client_name.clone()),
            cnpj: contract.cnpj.as_deref().map(mask_cpf_or_cnpj),
            reference: contract.reference.clone(),
            dispute_object: contract.observations.clone(),
            location: None,
            date: None,
            partners: partners.iter().map(SigningPartner::from_partner).collect(),
            fees: contract.fees.clone(),
            custom_body: None,
            proposal_code: contract.proposal_code.clone(),
        }
    }

    /// Fills every field left empty here from `base`; typed values win.
    pub fn with_defaults_from(self, base: ProposalForm) -> Self {
        Self {
            client_name: self.client_name.or(base.client_name),
            cnpj: self.cnpj.or(base.cnpj),
            reference: self.reference.or(base.reference),
            dispute_object: self.dispute_object.or(base.dispute_object),
            location: self.location.or(base.location),
            date: self.date.or(base.date),
            partners: if self.partners.is_empty() {
                base.partners
            } else {
                self.partners
            },
            fees: if self.fees == ContractFees::default() {
                base.fees
            } else {
                self.fees
            },
            custom_body: self.custom_body.or(base.custom_body),
            proposal_code: self.proposal_code.or(base.proposal_code),
        }
    }

    /// Signing partners, or the single placeholder partner.
    pub fn signing_partners(&self) -> Vec<SigningPartner> {
        if self.partners.is_empty() {
            vec![SigningPartner::default()]
        } else {
            self.partners.clone()
        }
    }

    pub fn has_custom_body(&self) -> bool {
        self.custom_body
            .as_deref()
            .is_some_and(|body| !body.trim().is_empty())
    }
}

/// `PROP-2026-0042` for a contract with sequence 42.
pub fn proposal_code_for_contract(seq_id: i64, date: NaiveDate) -> String {
    format!("PROP-{}-{seq_id:04}", date.year())
}

/// Code for proposals drafted without a stored contract.
pub fn standalone_proposal_code(date: NaiveDate) -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!("PROP-{}-{}", date.year(), token[..8].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partner(gender: Gender) -> SigningPartner {
        SigningPartner {
            name: "Ana Lima".to_string(),
            gender,
            civil_status: "Casado".to_string(),
            nationality: "Brasileiro".to_string(),
            oab_number: "123456".to_string(),
            oab_state: "RJ".to_string(),
            cpf: "123.456.789-01".to_string(),
        }
    }

    #[test]
    fn female_partner_qualification_agrees_in_gender() {
        assert_eq!(
            partner(Gender::Female).qualification(),
            ", brasileira, casada, advogada, inscrita na OAB/RJ sob o nº 123456, portadora do CPF/MF nº 123.456.789-01"
        );
    }

    #[test]
    fn male_partner_qualification_keeps_registry_text() {
        assert_eq!(
            partner(Gender::Male).qualification(),
            ", brasileiro, casado, advogado, inscrito na OAB/RJ sob o nº 123456, portador do CPF/MF nº 123.456.789-01"
        );
    }

    #[test]
    fn registry_partner_fills_placeholders() {
        let mut registry = Partner::new("Carlos Souza");
        registry.cpf = Some("12345678901".to_string());
        let signing = SigningPartner::from_partner(&registry);
        assert_eq!(signing.cpf, "123.456.789-01");
        assert_eq!(signing.oab_number, "XXXXXX");
        assert_eq!(signing.civil_status, "casado");
    }

    #[test]
    fn empty_partner_list_prints_placeholder() {
        let form = ProposalForm::default();
        let partners = form.signing_partners();
        assert_eq!(partners.len(), 1);
        assert_eq!(partners[0].name, "[incluir nome do sócio]");
    }

    #[test]
    fn typed_form_values_win_over_contract_defaults() {
        let mut contract = Contract::new("ACME SA", crate::model::contract::ContractStatus::Analysis);
        contract.reference = Some("Ação de cobrança".to_string());
        contract.cnpj = Some("12345678000190".to_string());
        let base = ProposalForm::from_contract(&contract, &[Partner::new("Ana")]);

        let typed = ProposalForm {
            reference: Some("Recurso especial".to_string()),
            ..ProposalForm::default()
        };
        let merged = typed.with_defaults_from(base);
        assert_eq!(merged.reference.as_deref(), Some("Recurso especial"));
        assert_eq!(merged.client_name.as_deref(), Some("ACME SA"));
        assert_eq!(merged.cnpj.as_deref(), Some("12.345.678/0001-90"));
        assert_eq!(merged.partners[0].name, "Ana");
    }

    #[test]
    fn codes_carry_year_and_sequence() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        assert_eq!(proposal_code_for_contract(42, date), "PROP-2026-0042");
        let standalone = standalone_proposal_code(date);
        assert!(standalone.starts_with("PROP-2026-"));
        assert_eq!(standalone.len(), "PROP-2026-".len() + 8);
    }
}
