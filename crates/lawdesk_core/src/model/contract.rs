//! Contract pipeline record and fee clauses.
//!
//! # Responsibility
//! - Model the contract lifecycle status and its per-status dates.
//! - Model fee clauses as typed free text with a currency or percent tag.
//!
//! # Invariants
//! - Each status owns exactly one date field (`ContractStatus::date_field`).
//! - Clause values keep the text as typed; parsing happens at render time.

use crate::model::client::Client;
use crate::model::validation::{check_date, check_document, require_text, ValidationResult};
use crate::model::{clean_optional, EntityId};
use crate::text::extenso::{currency_in_words, percent_in_words};
use crate::text::money::{format_brl, format_percent, parse_brl_amount, parse_percent_amount};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pipeline stage of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Analysis,
    Proposal,
    Active,
    Rejected,
    Probono,
}

impl ContractStatus {
    pub const ALL: [ContractStatus; 5] = [
        Self::Analysis,
        Self::Proposal,
        Self::Active,
        Self::Rejected,
        Self::Probono,
    ];

    pub fn as_db(self) -> &'static str {
        match self {
            Self::Analysis => "analysis",
            Self::Proposal => "proposal",
            Self::Active => "active",
            Self::Rejected => "rejected",
            Self::Probono => "probono",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_db() == value.trim())
    }

    /// Display label used in exports and generated text.
    pub fn label(self) -> &'static str {
        match self {
            Self::Analysis => "Sob Análise",
            Self::Proposal => "Proposta Enviada",
            Self::Active => "Contrato Fechado",
            Self::Rejected => "Rejeitada",
            Self::Probono => "Probono",
        }
    }

    /// Column stamped when a contract enters this status.
    pub fn date_field(self) -> &'static str {
        match self {
            Self::Analysis => "prospect_date",
            Self::Proposal => "proposal_date",
            Self::Active => "contract_date",
            Self::Rejected => "rejection_date",
            Self::Probono => "probono_date",
        }
    }
}

/// How a clause value is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseKind {
    #[default]
    Currency,
    Percent,
}

/// One fee line item: value as typed plus its payment description.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Clause {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub kind: ClauseKind,
}

impl Clause {
    pub fn currency(value: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: description.into(),
            kind: ClauseKind::Currency,
        }
    }

    pub fn percent(value: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: description.into(),
            kind: ClauseKind::Percent,
        }
    }

    /// Numeric amount, or `None` when the typed text does not parse.
    pub fn amount(&self) -> Option<f64> {
        match self.kind {
            ClauseKind::Currency => parse_brl_amount(&self.value),
            ClauseKind::Percent => parse_percent_amount(&self.value),
        }
    }

    pub fn has_value(&self) -> bool {
        self.amount().is_some()
    }

    /// `R$ 1.200,50` or `10,5%`; `None` when the value is missing or malformed.
    pub fn formatted(&self) -> Option<String> {
        let amount = self.amount()?;
        Some(match self.kind {
            ClauseKind::Currency => format_brl(amount),
            ClauseKind::Percent => format_percent(amount),
        })
    }

    /// Amount in words, empty for malformed input.
    pub fn words(&self) -> String {
        match (self.kind, self.amount()) {
            (ClauseKind::Currency, Some(amount)) => currency_in_words(amount),
            (ClauseKind::Percent, Some(amount)) => percent_in_words(amount),
            (_, None) => String::new(),
        }
    }

    /// ` (mil reais)` suffix, empty when there are no words to show.
    pub fn words_suffix(&self) -> String {
        let words = self.words();
        if words.is_empty() {
            String::new()
        } else {
            format!(" ({words})")
        }
    }

    /// `R$ 1.000,00 (mil reais)` with `placeholder` for missing values.
    pub fn rendered_or(&self, placeholder: &str) -> String {
        match self.formatted() {
            Some(formatted) => format!("{formatted}{}", self.words_suffix()),
            None => placeholder.to_string(),
        }
    }
}

/// Fee structure stored as JSON on the contract row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractFees {
    pub pro_labore: Option<Clause>,
    pub pro_labore_extras: Vec<Clause>,
    pub intermediate_fees: Vec<Clause>,
    pub final_success_fee: Option<Clause>,
    pub final_success_percent: Option<Clause>,
    pub final_success_extras: Vec<Clause>,
}

/// A contract in the firm pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: EntityId,
    /// Human-facing sequential number; assigned by the store on insert.
    pub seq_id: i64,
    pub client_id: Option<EntityId>,
    pub client_name: String,
    pub cnpj: Option<String>,
    pub partner_id: Option<EntityId>,
    pub status: ContractStatus,
    pub reference: Option<String>,
    pub observations: Option<String>,
    pub area: Option<String>,
    pub uf: Option<String>,
    pub hon_number: Option<String>,
    pub proposal_code: Option<String>,
    pub fees: ContractFees,
    pub prospect_date: Option<String>,
    pub proposal_date: Option<String>,
    pub contract_date: Option<String>,
    pub rejection_date: Option<String>,
    pub probono_date: Option<String>,
}

impl Contract {
    pub fn new(client_name: impl Into<String>, status: ContractStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            seq_id: 0,
            client_id: None,
            client_name: client_name.into(),
            cnpj: None,
            partner_id: None,
            status,
            reference: None,
            observations: None,
            area: None,
            uf: None,
            hon_number: None,
            proposal_code: None,
            fees: ContractFees::default(),
            prospect_date: None,
            proposal_date: None,
            contract_date: None,
            rejection_date: None,
            probono_date: None,
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        require_text("contract", "client_name", &self.client_name)?;
        check_document("contract.cnpj", self.cnpj.as_deref())?;
        check_date("contract.prospect_date", self.prospect_date.as_deref())?;
        check_date("contract.proposal_date", self.proposal_date.as_deref())?;
        check_date("contract.contract_date", self.contract_date.as_deref())?;
        check_date("contract.rejection_date", self.rejection_date.as_deref())?;
        check_date("contract.probono_date", self.probono_date.as_deref())?;
        Ok(())
    }

    pub fn normalized(mut self) -> Self {
        self.client_name = self.client_name.trim().to_string();
        self.cnpj = clean_optional(self.cnpj);
        self.reference = clean_optional(self.reference);
        self.observations = clean_optional(self.observations);
        self.area = clean_optional(self.area);
        self.uf = clean_optional(self.uf).map(|uf| uf.to_uppercase());
        self.hon_number = clean_optional(self.hon_number);
        self.proposal_code = clean_optional(self.proposal_code);
        self.prospect_date = clean_optional(self.prospect_date);
        self.proposal_date = clean_optional(self.proposal_date);
        self.contract_date = clean_optional(self.contract_date);
        self.rejection_date = clean_optional(self.rejection_date);
        self.probono_date = clean_optional(self.probono_date);
        self
    }

    /// Links the contract to `client`, taking its name, document and
    /// responsible partner where the contract has none of its own.
    pub fn fill_from_client(&mut self, client: &Client) {
        self.client_id = Some(client.id);
        if self.client_name.trim().is_empty() {
            self.client_name = client.name.clone();
        }
        if self.cnpj.as_deref().map_or(true, |doc| doc.trim().is_empty()) {
            self.cnpj = client.cnpj.clone();
        }
        if self.partner_id.is_none() {
            self.partner_id = client.partner_id;
        }
    }

    pub fn date_for(&self, status: ContractStatus) -> Option<&str> {
        match status {
            ContractStatus::Analysis => self.prospect_date.as_deref(),
            ContractStatus::Proposal => self.proposal_date.as_deref(),
            ContractStatus::Active => self.contract_date.as_deref(),
            ContractStatus::Rejected => self.rejection_date.as_deref(),
            ContractStatus::Probono => self.probono_date.as_deref(),
        }
    }

    pub fn set_date_for(&mut self, status: ContractStatus, date: Option<String>) {
        let slot = match status {
            ContractStatus::Analysis => &mut self.prospect_date,
            ContractStatus::Proposal => &mut self.proposal_date,
            ContractStatus::Active => &mut self.contract_date,
            ContractStatus::Rejected => &mut self.rejection_date,
            ContractStatus::Probono => &mut self.probono_date,
        };
        *slot = date;
    }

    /// Date of the current status; probono contracts fall back to the contract date.
    pub fn effective_date(&self) -> Option<&str> {
        match self.status {
            ContractStatus::Probono => self
                .probono_date
                .as_deref()
                .or(self.contract_date.as_deref()),
            status => self.date_for(status),
        }
    }
}

/// One status transition recorded for a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractTimelineEvent {
    pub id: i64,
    pub contract_id: EntityId,
    pub old_status: Option<ContractStatus>,
    pub new_status: ContractStatus,
    pub changed_by: Option<String>,
    /// Epoch milliseconds.
    pub changed_at: i64,
}

#[cfg(test)]
mod tests {
    use super::{Clause, Contract, ContractFees, ContractStatus};
    use crate::model::client::Client;
    use crate::model::validation::ValidationError;
    use uuid::Uuid;

    #[test]
    fn contract_document_accepts_cpf_or_cnpj() {
        let mut contract = Contract::new("Maria Souza", ContractStatus::Analysis);
        contract.cnpj = Some("123.456.789-01".to_string());
        assert_eq!(contract.validate(), Ok(()));
        contract.cnpj = Some("12.345.678/0001-90".to_string());
        assert_eq!(contract.validate(), Ok(()));
        contract.cnpj = Some("123456789012".to_string());
        assert_eq!(
            contract.validate(),
            Err(ValidationError::InvalidDocument {
                field: "contract.cnpj",
                actual: 12,
            })
        );
    }

    #[test]
    fn fill_from_client_keeps_values_already_typed() {
        let mut client = Client::new("Maria Souza");
        client.is_person = true;
        client.cnpj = Some("12345678901".to_string());
        client.partner_id = Some(Uuid::new_v4());

        let mut blank = Contract::new("", ContractStatus::Analysis);
        blank.fill_from_client(&client);
        assert_eq!(blank.client_id, Some(client.id));
        assert_eq!(blank.client_name, "Maria Souza");
        assert_eq!(blank.cnpj.as_deref(), Some("12345678901"));
        assert_eq!(blank.partner_id, client.partner_id);

        let mut typed = Contract::new("Maria S.", ContractStatus::Analysis);
        typed.cnpj = Some("12345678000190".to_string());
        typed.fill_from_client(&client);
        assert_eq!(typed.client_name, "Maria S.");
        assert_eq!(typed.cnpj.as_deref(), Some("12345678000190"));
    }

    #[test]
    fn clause_renders_amount_with_words() {
        let clause = Clause::currency("1.200,50", "à vista");
        assert_eq!(
            clause.rendered_or("[incluir valor]"),
            "R$ 1.200,50 (mil e duzentos reais e cinquenta centavos)"
        );
        let percent = Clause::percent("10,5", "");
        assert_eq!(
            percent.rendered_or("[incluir %]"),
            "10,5% (dez vírgula cinco por cento)"
        );
    }

    #[test]
    fn malformed_clause_falls_back_to_placeholder() {
        let clause = Clause::currency("a combinar", "");
        assert_eq!(clause.words_suffix(), "");
        assert_eq!(clause.rendered_or("[incluir valor]"), "[incluir valor]");
    }

    #[test]
    fn effective_date_follows_status() {
        let mut contract = Contract::new("ACME", ContractStatus::Probono);
        contract.contract_date = Some("2026-01-10".to_string());
        assert_eq!(contract.effective_date(), Some("2026-01-10"));
        contract.set_date_for(ContractStatus::Probono, Some("2026-02-01".to_string()));
        assert_eq!(contract.effective_date(), Some("2026-02-01"));
        contract.status = ContractStatus::Analysis;
        assert_eq!(contract.effective_date(), None);
    }

    #[test]
    fn fees_tolerate_missing_json_keys() {
        let fees: ContractFees =
            serde_json::from_str(r#"{"pro_labore":{"value":"5000"}}"#).unwrap();
        assert_eq!(fees.pro_labore.unwrap().amount(), Some(5000.0));
        assert!(fees.intermediate_fees.is_empty());
    }

    #[test]
    fn status_parse_is_inverse_of_as_db() {
        for status in ContractStatus::ALL {
            assert_eq!(ContractStatus::parse(status.as_db()), Some(status));
        }
        assert_eq!(ContractStatus::parse("unknown"), None);
    }
}
