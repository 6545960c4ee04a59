//! Contract repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist contracts with their JSON fee structure.
//! - Record every status transition in `contract_timeline`.
//!
//! # Invariants
//! - `seq_id` is `MAX(seq_id) + 1`, assigned inside the insert transaction.
//! - A status change updates the row, stamps the status date and appends
//!   one timeline row inside one immediate transaction.

use crate::model::contract::{Contract, ContractFees, ContractStatus, ContractTimelineEvent};
use crate::model::EntityId;
use crate::repo::schema::{
    ensure_connection_ready, get_json, get_optional_uuid, get_uuid, table_exists, to_json,
    uuid_text,
};
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};

const CONTRACT_COLUMNS: [&str; 19] = [
    "id",
    "seq_id",
    "client_id",
    "client_name",
    "cnpj",
    "partner_id",
    "status",
    "reference",
    "observations",
    "area",
    "uf",
    "hon_number",
    "proposal_code",
    "fees",
    "prospect_date",
    "proposal_date",
    "contract_date",
    "rejection_date",
    "probono_date",
];

const CONTRACT_SELECT_SQL: &str = "SELECT
    id,
    seq_id,
    client_id,
    client_name,
    cnpj,
    partner_id,
    status,
    reference,
    observations,
    area,
    uf,
    hon_number,
    proposal_code,
    fees,
    prospect_date,
    proposal_date,
    contract_date,
    rejection_date,
    probono_date
FROM contracts";

/// Query options for listing contracts.
#[derive(Debug, Clone, Default)]
pub struct ContractListQuery {
    pub status: Option<ContractStatus>,
    pub partner_id: Option<EntityId>,
    pub client_id: Option<EntityId>,
}

/// Contract count for one status and partner pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumetryRow {
    pub status: ContractStatus,
    pub partner_id: Option<EntityId>,
    /// `None` for contracts with no partner assigned.
    pub partner_name: Option<String>,
    pub count: i64,
}

/// Status transition request applied atomically.
#[derive(Debug, Clone)]
pub struct StatusChange<'a> {
    pub contract_id: EntityId,
    pub new_status: ContractStatus,
    /// ISO date stamped into the new status' date column.
    pub date: &'a str,
    pub changed_by: Option<&'a str>,
}

pub trait ContractRepository {
    /// Inserts the contract and returns the assigned `seq_id`.
    fn create_contract(&self, contract: &Contract) -> RepoResult<i64>;
    fn update_contract(&self, contract: &Contract) -> RepoResult<()>;
    fn get_contract(&self, id: EntityId) -> RepoResult<Option<Contract>>;
    fn list_contracts(&self, query: &ContractListQuery) -> RepoResult<Vec<Contract>>;
    fn delete_contract(&self, id: EntityId) -> RepoResult<()>;
    /// Applies a status change; returns the previous status.
    fn change_status(&self, change: &StatusChange<'_>) -> RepoResult<ContractStatus>;
    /// Timeline rows oldest first.
    fn list_timeline(&self, contract_id: EntityId) -> RepoResult<Vec<ContractTimelineEvent>>;
    /// Stores the proposal code; a contract still in analysis moves to proposal.
    fn record_proposal(
        &self,
        contract_id: EntityId,
        proposal_code: &str,
        date: &str,
        changed_by: Option<&str>,
    ) -> RepoResult<()>;
    fn volumetry(&self) -> RepoResult<Vec<VolumetryRow>>;
}

pub struct SqliteContractRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContractRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "contracts", &CONTRACT_COLUMNS)?;
        if !table_exists(conn, "contract_timeline")? {
            return Err(RepoError::MissingRequiredTable("contract_timeline"));
        }
        Ok(Self { conn })
    }
}

impl ContractRepository for SqliteContractRepository<'_> {
    fn create_contract(&self, contract: &Contract) -> RepoResult<i64> {
        contract.validate()?;
        let fees = to_json(&contract.fees, "contracts.fees")?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let seq_id: i64 = tx.query_row(
            "SELECT COALESCE(MAX(seq_id), 0) + 1 FROM contracts;",
            [],
            |row| row.get(0),
        )?;
        tx.execute(
            "INSERT INTO contracts (
                id, seq_id, client_id, client_name, cnpj, partner_id, status,
                reference, observations, area, uf, hon_number, proposal_code, fees,
                prospect_date, proposal_date, contract_date, rejection_date, probono_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19);",
            params![
                contract.id.to_string(),
                seq_id,
                uuid_text(contract.client_id),
                contract.client_name.as_str(),
                contract.cnpj.as_deref(),
                uuid_text(contract.partner_id),
                contract.status.as_db(),
                contract.reference.as_deref(),
                contract.observations.as_deref(),
                contract.area.as_deref(),
                contract.uf.as_deref(),
                contract.hon_number.as_deref(),
                contract.proposal_code.as_deref(),
                fees,
                contract.prospect_date.as_deref(),
                contract.proposal_date.as_deref(),
                contract.contract_date.as_deref(),
                contract.rejection_date.as_deref(),
                contract.probono_date.as_deref(),
            ],
        )?;
        insert_timeline(&tx, contract.id, None, contract.status, None)?;
        tx.commit()?;

        Ok(seq_id)
    }

    fn update_contract(&self, contract: &Contract) -> RepoResult<()> {
        contract.validate()?;
        let fees = to_json(&contract.fees, "contracts.fees")?;

        let changed = self.conn.execute(
            "UPDATE contracts
             SET
                client_id = ?1,
                client_name = ?2,
                cnpj = ?3,
                partner_id = ?4,
                status = ?5,
                reference = ?6,
                observations = ?7,
                area = ?8,
                uf = ?9,
                hon_number = ?10,
                proposal_code = ?11,
                fees = ?12,
                prospect_date = ?13,
                proposal_date = ?14,
                contract_date = ?15,
                rejection_date = ?16,
                probono_date = ?17,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?18;",
            params![
                uuid_text(contract.client_id),
                contract.client_name.as_str(),
                contract.cnpj.as_deref(),
                uuid_text(contract.partner_id),
                contract.status.as_db(),
                contract.reference.as_deref(),
                contract.observations.as_deref(),
                contract.area.as_deref(),
                contract.uf.as_deref(),
                contract.hon_number.as_deref(),
                contract.proposal_code.as_deref(),
                fees,
                contract.prospect_date.as_deref(),
                contract.proposal_date.as_deref(),
                contract.contract_date.as_deref(),
                contract.rejection_date.as_deref(),
                contract.probono_date.as_deref(),
                contract.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "contract",
                id: contract.id,
            });
        }

        Ok(())
    }

    fn get_contract(&self, id: EntityId) -> RepoResult<Option<Contract>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTRACT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_contract_row(row)?));
        }
        Ok(None)
    }

    fn list_contracts(&self, query: &ContractListQuery) -> RepoResult<Vec<Contract>> {
        let mut sql = format!("{CONTRACT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_db().to_string()));
        }
        if let Some(partner_id) = query.partner_id {
            sql.push_str(" AND partner_id = ?");
            bind_values.push(Value::Text(partner_id.to_string()));
        }
        if let Some(client_id) = query.client_id {
            sql.push_str(" AND client_id = ?");
            bind_values.push(Value::Text(client_id.to_string()));
        }

        sql.push_str(" ORDER BY seq_id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut contracts = Vec::new();
        while let Some(row) = rows.next()? {
            contracts.push(parse_contract_row(row)?);
        }
        Ok(contracts)
    }

    fn delete_contract(&self, id: EntityId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM contracts WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "contract",
                id,
            });
        }
        Ok(())
    }

    fn change_status(&self, change: &StatusChange<'_>) -> RepoResult<ContractStatus> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let old_status = load_status(&tx, change.contract_id)?;

        tx.execute(
            &format!(
                "UPDATE contracts
                 SET status = ?2,
                     {date_field} = ?3,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                date_field = change.new_status.date_field()
            ),
            params![
                change.contract_id.to_string(),
                change.new_status.as_db(),
                change.date,
            ],
        )?;
        insert_timeline(
            &tx,
            change.contract_id,
            Some(old_status),
            change.new_status,
            change.changed_by,
        )?;

        tx.commit()?;
        Ok(old_status)
    }

    fn list_timeline(&self, contract_id: EntityId) -> RepoResult<Vec<ContractTimelineEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, contract_id, old_status, new_status, changed_by, changed_at
             FROM contract_timeline
             WHERE contract_id = ?1
             ORDER BY changed_at ASC, id ASC;",
        )?;
        let mut rows = stmt.query([contract_id.to_string()])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_timeline_row(row)?);
        }
        Ok(events)
    }

    fn record_proposal(
        &self,
        contract_id: EntityId,
        proposal_code: &str,
        date: &str,
        changed_by: Option<&str>,
    ) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let old_status = load_status(&tx, contract_id)?;

        if old_status == ContractStatus::Analysis {
            tx.execute(
                "UPDATE contracts
                 SET proposal_code = ?2,
                     status = 'proposal',
                     proposal_date = ?3,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                params![contract_id.to_string(), proposal_code, date],
            )?;
            insert_timeline(
                &tx,
                contract_id,
                Some(old_status),
                ContractStatus::Proposal,
                changed_by,
            )?;
        } else {
            tx.execute(
                "UPDATE contracts
                 SET proposal_code = ?2,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                params![contract_id.to_string(), proposal_code],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn volumetry(&self) -> RepoResult<Vec<VolumetryRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.status AS status,
                    c.partner_id AS partner_id,
                    p.name AS partner_name,
                    COUNT(*) AS total
             FROM contracts c
             LEFT JOIN partners p ON p.id = c.partner_id
             GROUP BY c.status, c.partner_id, p.name
             ORDER BY c.status ASC, p.name COLLATE NOCASE ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            result.push(VolumetryRow {
                status: parse_status(&row.get::<_, String>("status")?, "contracts.status")?,
                partner_id: get_optional_uuid(row, "partner_id")?,
                partner_name: row.get("partner_name")?,
                count: row.get("total")?,
            });
        }
        Ok(result)
    }
}

fn load_status(tx: &Transaction<'_>, contract_id: EntityId) -> RepoResult<ContractStatus> {
    let status: Option<String> = tx
        .query_row(
            "SELECT status FROM contracts WHERE id = ?1;",
            [contract_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    match status {
        Some(text) => parse_status(&text, "contracts.status"),
        None => Err(RepoError::NotFound {
            entity: "contract",
            id: contract_id,
        }),
    }
}

fn insert_timeline(
    tx: &Transaction<'_>,
    contract_id: EntityId,
    old_status: Option<ContractStatus>,
    new_status: ContractStatus,
    changed_by: Option<&str>,
) -> RepoResult<()> {
    tx.execute(
        "INSERT INTO contract_timeline (contract_id, old_status, new_status, changed_by)
         VALUES (?1, ?2, ?3, ?4);",
        params![
            contract_id.to_string(),
            old_status.map(ContractStatus::as_db),
            new_status.as_db(),
            changed_by,
        ],
    )?;
    Ok(())
}

fn parse_status(value: &str, column: &'static str) -> RepoResult<ContractStatus> {
    ContractStatus::parse(value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid status `{value}` in {column}")))
}

fn parse_contract_row(row: &Row<'_>) -> RepoResult<Contract> {
    let status_text: String = row.get("status")?;
    let fees: ContractFees = get_json(row, "fees")?;
    Ok(Contract {
        id: get_uuid(row, "id")?,
        seq_id: row.get("seq_id")?,
        client_id: get_optional_uuid(row, "client_id")?,
        client_name: row.get("client_name")?,
        cnpj: row.get("cnpj")?,
        partner_id: get_optional_uuid(row, "partner_id")?,
        status: parse_status(&status_text, "contracts.status")?,
        reference: row.get("reference")?,
        observations: row.get("observations")?,
        area: row.get("area")?,
        uf: row.get("uf")?,
        hon_number: row.get("hon_number")?,
        proposal_code: row.get("proposal_code")?,
        fees,
        prospect_date: row.get("prospect_date")?,
        proposal_date: row.get("proposal_date")?,
        contract_date: row.get("contract_date")?,
        rejection_date: row.get("rejection_date")?,
        probono_date: row.get("probono_date")?,
    })
}

fn parse_timeline_row(row: &Row<'_>) -> RepoResult<ContractTimelineEvent> {
    let old_status = match row.get::<_, Option<String>>("old_status")? {
        Some(text) => Some(parse_status(&text, "contract_timeline.old_status")?),
        None => None,
    };
    let new_status_text: String = row.get("new_status")?;
    Ok(ContractTimelineEvent {
        id: row.get("id")?,
        contract_id: get_uuid(row, "contract_id")?,
        old_status,
        new_status: parse_status(&new_status_text, "contract_timeline.new_status")?,
        changed_by: row.get("changed_by")?,
        changed_at: row.get("changed_at")?,
    })
}
