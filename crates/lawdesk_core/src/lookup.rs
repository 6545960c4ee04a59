//! Company registry (CNPJ) and postal code (CEP) lookups.
//!
//! # Responsibility
//! - Fetch registry data over HTTP with a bounded timeout.
//! - Normalize response bodies into form-ready records.
//!
//! # Invariants
//! - One request per lookup; failures surface as `LookupError`, never retried.
//! - Body parsing is pure so it can be exercised without a network.

use crate::config::LookupConfig;
use crate::text::masks::{digits_only, mask_cep, mask_phone, to_title_case};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub enum LookupError {
    /// Input does not have the digit count the registry expects.
    InvalidInput {
        kind: &'static str,
        value: String,
    },
    Http(reqwest::Error),
    Status {
        url: String,
        status: u16,
    },
    /// Registry answered but has no record for the key.
    NotFound(String),
    Decode(String),
}

impl Display for LookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { kind, value } => write!(f, "invalid {kind}: `{value}`"),
            Self::Http(err) => write!(f, "lookup request failed: {err}"),
            Self::Status { url, status } => write!(f, "lookup `{url}` returned HTTP {status}"),
            Self::NotFound(key) => write!(f, "no registry record for {key}"),
            Self::Decode(message) => write!(f, "cannot decode lookup response: {message}"),
        }
    }
}

impl Error for LookupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

/// Company data used to pre-fill a client record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompanyInfo {
    pub name: String,
    pub address: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub city: Option<String>,
    pub uf: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Street address resolved from a postal code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddressInfo {
    pub zip_code: String,
    pub street: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub uf: Option<String>,
}

#[derive(Deserialize)]
struct CnpjBody {
    razao_social: Option<String>,
    nome_fantasia: Option<String>,
    logradouro: Option<String>,
    numero: Option<String>,
    complemento: Option<String>,
    municipio: Option<String>,
    uf: Option<String>,
    email: Option<String>,
    ddd_telefone_1: Option<String>,
}

#[derive(Deserialize)]
struct CepBody {
    #[serde(default)]
    erro: Option<serde_json::Value>,
    logradouro: Option<String>,
    bairro: Option<String>,
    localidade: Option<String>,
    uf: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn titled(value: Option<String>) -> Option<String> {
    non_blank(value).map(|v| to_title_case(&v))
}

/// Parses a BrasilAPI CNPJ body.
pub fn parse_company_response(body: &str) -> Result<CompanyInfo, LookupError> {
    let parsed: CnpjBody =
        serde_json::from_str(body).map_err(|err| LookupError::Decode(err.to_string()))?;
    let name = non_blank(parsed.razao_social)
        .or_else(|| non_blank(parsed.nome_fantasia))
        .ok_or_else(|| LookupError::Decode("response has no company name".to_string()))?;
    Ok(CompanyInfo {
        name: to_title_case(&name),
        address: titled(parsed.logradouro),
        number: non_blank(parsed.numero),
        complement: titled(parsed.complemento),
        city: titled(parsed.municipio),
        uf: non_blank(parsed.uf).map(|uf| uf.to_uppercase()),
        email: non_blank(parsed.email).map(|email| email.to_lowercase()),
        phone: non_blank(parsed.ddd_telefone_1).map(|phone| mask_phone(&phone)),
    })
}

/// Parses a ViaCEP body; `"erro": true` means the code does not exist.
pub fn parse_cep_response(body: &str, cep: &str) -> Result<AddressInfo, LookupError> {
    let parsed: CepBody =
        serde_json::from_str(body).map_err(|err| LookupError::Decode(err.to_string()))?;
    let flagged = match &parsed.erro {
        Some(serde_json::Value::Bool(flag)) => *flag,
        Some(serde_json::Value::String(text)) => text == "true",
        _ => false,
    };
    if flagged {
        return Err(LookupError::NotFound(format!("CEP {}", mask_cep(cep))));
    }
    Ok(AddressInfo {
        zip_code: mask_cep(cep),
        street: non_blank(parsed.logradouro),
        neighborhood: non_blank(parsed.bairro),
        city: non_blank(parsed.localidade),
        uf: non_blank(parsed.uf).map(|uf| uf.to_uppercase()),
    })
}

/// Blocking HTTP client for the two public registries.
pub struct LookupClient {
    http: reqwest::blocking::Client,
    cnpj_base_url: String,
    cep_base_url: String,
}

impl LookupClient {
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("lawdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            cnpj_base_url: config.cnpj_base_url.trim_end_matches('/').to_string(),
            cep_base_url: config.cep_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn lookup_cnpj(&self, cnpj: &str) -> Result<CompanyInfo, LookupError> {
        let digits = digits_only(cnpj);
        if digits.len() != 14 {
            return Err(LookupError::InvalidInput {
                kind: "CNPJ",
                value: cnpj.to_string(),
            });
        }
        let url = format!("{}/api/cnpj/v1/{digits}", self.cnpj_base_url);
        let body = self.fetch(&url, "cnpj")?;
        match body {
            Some(body) => parse_company_response(&body),
            None => Err(LookupError::NotFound(format!("CNPJ {digits}"))),
        }
    }

    pub fn lookup_cep(&self, cep: &str) -> Result<AddressInfo, LookupError> {
        let digits = digits_only(cep);
        if digits.len() != 8 {
            return Err(LookupError::InvalidInput {
                kind: "CEP",
                value: cep.to_string(),
            });
        }
        let url = format!("{}/ws/{digits}/json/", self.cep_base_url);
        match self.fetch(&url, "cep")? {
            Some(body) => parse_cep_response(&body, &digits),
            None => Err(LookupError::NotFound(format!("CEP {}", mask_cep(&digits)))),
        }
    }

    /// Returns the body, or `None` on HTTP 404.
    fn fetch(&self, url: &str, kind: &str) -> Result<Option<String>, LookupError> {
        let started_at = Instant::now();
        let response = self.http.get(url).send()?;
        let status = response.status();
        let duration_ms = started_at.elapsed().as_millis();
        if status == reqwest::StatusCode::NOT_FOUND {
            info!("event=lookup module=lookup kind={kind} status=not_found duration_ms={duration_ms}");
            return Ok(None);
        }
        if !status.is_success() {
            warn!(
                "event=lookup module=lookup kind={kind} status=error http_status={} duration_ms={duration_ms}",
                status.as_u16()
            );
            return Err(LookupError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        info!("event=lookup module=lookup kind={kind} status=ok duration_ms={duration_ms}");
        Ok(Some(response.text()?))
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_cep_response, parse_company_response, LookupError};

    #[test]
    fn company_body_is_title_cased_and_masked() {
        let body = r#"{
            "razao_social": "ACME COMERCIO DE PECAS LTDA",
            "nome_fantasia": "ACME",
            "logradouro": "RUA DA ASSEMBLEIA",
            "numero": "10",
            "complemento": "",
            "municipio": "RIO DE JANEIRO",
            "uf": "rj",
            "email": "CONTATO@ACME.COM.BR",
            "ddd_telefone_1": "2133334444"
        }"#;
        let info = parse_company_response(body).unwrap();
        assert_eq!(info.name, "Acme Comercio de Pecas Ltda");
        assert_eq!(info.address.as_deref(), Some("Rua da Assembleia"));
        assert_eq!(info.complement, None);
        assert_eq!(info.city.as_deref(), Some("Rio de Janeiro"));
        assert_eq!(info.uf.as_deref(), Some("RJ"));
        assert_eq!(info.email.as_deref(), Some("contato@acme.com.br"));
        assert_eq!(info.phone.as_deref(), Some("(21) 3333-4444"));
    }

    #[test]
    fn company_name_falls_back_to_trade_name() {
        let info = parse_company_response(r#"{"razao_social": "", "nome_fantasia": "BETA"}"#)
            .unwrap();
        assert_eq!(info.name, "Beta");
        assert!(matches!(
            parse_company_response("{}"),
            Err(LookupError::Decode(_))
        ));
    }

    #[test]
    fn cep_error_flag_means_not_found() {
        assert!(matches!(
            parse_cep_response(r#"{"erro": true}"#, "99999999"),
            Err(LookupError::NotFound(_))
        ));
        assert!(matches!(
            parse_cep_response(r#"{"erro": "true"}"#, "99999999"),
            Err(LookupError::NotFound(_))
        ));
    }

    #[test]
    fn cep_body_maps_address_fields() {
        let body = r#"{
            "cep": "20011-000",
            "logradouro": "Rua da Assembleia",
            "bairro": "Centro",
            "localidade": "Rio de Janeiro",
            "uf": "RJ"
        }"#;
        let address = parse_cep_response(body, "20011000").unwrap();
        assert_eq!(address.zip_code, "20011-000");
        assert_eq!(address.street.as_deref(), Some("Rua da Assembleia"));
        assert_eq!(address.neighborhood.as_deref(), Some("Centro"));
    }
}
