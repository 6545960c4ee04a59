//! Client repository contract and SQLite implementation.

use crate::model::client::Client;
use crate::model::EntityId;
use crate::repo::schema::{
    bool_to_int, ensure_connection_ready, get_bool, get_optional_uuid, get_uuid, uuid_text,
};
use crate::repo::{RepoError, RepoResult};
use crate::text::masks::digits_only;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const CLIENT_COLUMNS: [&str; 12] = [
    "id",
    "name",
    "cnpj",
    "is_person",
    "email",
    "phone",
    "address",
    "number",
    "complement",
    "city",
    "uf",
    "partner_id",
];

const CLIENT_SELECT_SQL: &str = "SELECT
    id,
    name,
    cnpj,
    is_person,
    email,
    phone,
    address,
    number,
    complement,
    city,
    uf,
    partner_id
FROM clients";

/// Query options for listing clients.
#[derive(Debug, Clone, Default)]
pub struct ClientListQuery {
    pub partner_id: Option<EntityId>,
    /// Case-insensitive substring match on name.
    pub search: Option<String>,
}

pub trait ClientRepository {
    fn create_client(&self, client: &Client) -> RepoResult<EntityId>;
    fn update_client(&self, client: &Client) -> RepoResult<()>;
    fn get_client(&self, id: EntityId) -> RepoResult<Option<Client>>;
    /// Finds a client by document number, ignoring mask characters.
    fn find_client_by_document(&self, document: &str) -> RepoResult<Option<Client>>;
    fn list_clients(&self, query: &ClientListQuery) -> RepoResult<Vec<Client>>;
    /// Deletes a client; its CRM contacts go with it.
    fn delete_client(&self, id: EntityId) -> RepoResult<()>;
}

pub struct SqliteClientRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteClientRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "clients", &CLIENT_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl ClientRepository for SqliteClientRepository<'_> {
    fn create_client(&self, client: &Client) -> RepoResult<EntityId> {
        client.validate()?;

        self.conn.execute(
            "INSERT INTO clients (
                id, name, cnpj, is_person, email, phone,
                address, number, complement, city, uf, partner_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            params![
                client.id.to_string(),
                client.name.as_str(),
                client.cnpj.as_deref(),
                bool_to_int(client.is_person),
                client.email.as_deref(),
                client.phone.as_deref(),
                client.address.as_deref(),
                client.number.as_deref(),
                client.complement.as_deref(),
                client.city.as_deref(),
                client.uf.as_deref(),
                uuid_text(client.partner_id),
            ],
        )?;

        Ok(client.id)
    }

    fn update_client(&self, client: &Client) -> RepoResult<()> {
        client.validate()?;

        let changed = self.conn.execute(
            "UPDATE clients
             SET
                name = ?1,
                cnpj = ?2,
                is_person = ?3,
                email = ?4,
                phone = ?5,
                address = ?6,
                number = ?7,
                complement = ?8,
                city = ?9,
                uf = ?10,
                partner_id = ?11,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?12;",
            params![
                client.name.as_str(),
                client.cnpj.as_deref(),
                bool_to_int(client.is_person),
                client.email.as_deref(),
                client.phone.as_deref(),
                client.address.as_deref(),
                client.number.as_deref(),
                client.complement.as_deref(),
                client.city.as_deref(),
                client.uf.as_deref(),
                uuid_text(client.partner_id),
                client.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "client",
                id: client.id,
            });
        }

        Ok(())
    }

    fn get_client(&self, id: EntityId) -> RepoResult<Option<Client>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CLIENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_client_row(row)?));
        }
        Ok(None)
    }

    fn find_client_by_document(&self, document: &str) -> RepoResult<Option<Client>> {
        let wanted = digits_only(document);
        if wanted.is_empty() {
            return Ok(None);
        }
        let mut stmt = self.conn.prepare(&format!(
            "{CLIENT_SELECT_SQL} WHERE cnpj IS NOT NULL ORDER BY name COLLATE NOCASE ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let client = parse_client_row(row)?;
            if client.cnpj.as_deref().map(digits_only).as_deref() == Some(wanted.as_str()) {
                return Ok(Some(client));
            }
        }
        Ok(None)
    }

    fn list_clients(&self, query: &ClientListQuery) -> RepoResult<Vec<Client>> {
        let mut sql = format!("{CLIENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(partner_id) = query.partner_id {
            sql.push_str(" AND partner_id = ?");
            bind_values.push(Value::Text(partner_id.to_string()));
        }

        if let Some(search) = query.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                sql.push_str(" AND name LIKE ? ESCAPE '\\'");
                bind_values.push(Value::Text(format!("%{}%", escape_like(search))));
            }
        }

        sql.push_str(" ORDER BY name COLLATE NOCASE ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut clients = Vec::new();
        while let Some(row) = rows.next()? {
            clients.push(parse_client_row(row)?);
        }
        Ok(clients)
    }

    fn delete_client(&self, id: EntityId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM clients WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "client",
                id,
            });
        }
        Ok(())
    }
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn parse_client_row(row: &Row<'_>) -> RepoResult<Client> {
    Ok(Client {
        id: get_uuid(row, "id")?,
        name: row.get("name")?,
        cnpj: row.get("cnpj")?,
        is_person: get_bool(row, "is_person")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        address: row.get("address")?,
        number: row.get("number")?,
        complement: row.get("complement")?,
        city: row.get("city")?,
        uf: row.get("uf")?,
        partner_id: get_optional_uuid(row, "partner_id")?,
    })
}
