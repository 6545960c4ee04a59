//! Spreadsheet (CSV) exports.
//!
//! Files use `;` as separator and start with a UTF-8 BOM so pt-BR spreadsheet
//! tools open them with accents and decimal commas intact.
//!
//! CSV is the only spreadsheet format for the client and volumetry exports;
//! no workbook (`.xlsx`) files are written.

use crate::model::client::Client;
use crate::model::contract::ContractStatus;
use crate::model::EntityId;
use crate::repo::contract_repo::VolumetryRow;
use crate::text::masks::mask_cpf_or_cnpj;
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const SEPARATOR: char = ';';
const BOM: &str = "\u{feff}";
const NO_PARTNER_LABEL: &str = "Sem sócio";

#[derive(Debug)]
pub enum ExportError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot write export `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}

fn escape_field(value: &str) -> String {
    if value.contains([SEPARATOR, '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn push_record<I, S>(out: &mut String, fields: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let line = fields
        .into_iter()
        .map(|field| escape_field(field.as_ref()))
        .collect::<Vec<_>>()
        .join(&SEPARATOR.to_string());
    out.push_str(&line);
    out.push_str("\r\n");
}

/// Client list with the responsible partner's name resolved.
pub fn clients_csv(clients: &[Client], partner_names: &HashMap<EntityId, String>) -> String {
    let mut out = String::from(BOM);
    push_record(
        &mut out,
        [
            "Nome", "CNPJ/CPF", "E-mail", "Telefone", "Endereço", "Número", "Complemento",
            "Cidade", "UF", "Sócio",
        ],
    );
    for client in clients {
        let partner = client
            .partner_id
            .and_then(|id| partner_names.get(&id))
            .map(String::as_str)
            .unwrap_or("");
        let document = client
            .cnpj
            .as_deref()
            .map(mask_cpf_or_cnpj)
            .unwrap_or_default();
        push_record(
            &mut out,
            [
                client.name.as_str(),
                document.as_str(),
                client.email.as_deref().unwrap_or(""),
                client.phone.as_deref().unwrap_or(""),
                client.address.as_deref().unwrap_or(""),
                client.number.as_deref().unwrap_or(""),
                client.complement.as_deref().unwrap_or(""),
                client.city.as_deref().unwrap_or(""),
                client.uf.as_deref().unwrap_or(""),
                partner,
            ],
        );
    }
    out
}

/// Contract counts as a partner × status matrix with row and column totals.
pub fn volumetry_csv(rows: &[VolumetryRow]) -> String {
    let mut matrix: BTreeMap<String, BTreeMap<ContractStatus, i64>> = BTreeMap::new();
    for row in rows {
        let partner = row
            .partner_name
            .clone()
            .unwrap_or_else(|| NO_PARTNER_LABEL.to_string());
        *matrix
            .entry(partner)
            .or_default()
            .entry(row.status)
            .or_insert(0) += row.count;
    }

    let mut out = String::from(BOM);
    let mut header = vec!["Sócio".to_string()];
    header.extend(ContractStatus::ALL.iter().map(|s| s.label().to_string()));
    header.push("Total".to_string());
    push_record(&mut out, header);

    let mut column_totals = [0_i64; ContractStatus::ALL.len()];
    for (partner, counts) in &matrix {
        let mut record = vec![partner.clone()];
        let mut total = 0;
        for (index, status) in ContractStatus::ALL.iter().enumerate() {
            let count = counts.get(status).copied().unwrap_or(0);
            column_totals[index] += count;
            total += count;
            record.push(count.to_string());
        }
        record.push(total.to_string());
        push_record(&mut out, record);
    }

    let mut footer = vec!["Total".to_string()];
    footer.extend(column_totals.iter().map(i64::to_string));
    footer.push(column_totals.iter().sum::<i64>().to_string());
    push_record(&mut out, footer);
    out
}

pub fn write_export(path: &Path, content: &str) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, content).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
