//! CRM contact repository contract and SQLite implementation.
//!
//! # Invariants
//! - At most one contact per client has `is_main_contact = 1`; writes that set
//!   the flag clear it on siblings in the same transaction.
//! - `gift_history` and `ignored_fields` are stored as JSON arrays.

use crate::model::crm::{CrmContact, GiftType};
use crate::model::EntityId;
use crate::repo::schema::{
    bool_to_int, ensure_connection_ready, get_bool, get_json, get_optional_uuid, get_uuid,
    parse_uuid, to_json,
};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const CRM_COLUMNS: [&str; 20] = [
    "id",
    "client_id",
    "name",
    "role",
    "email",
    "phone",
    "is_main_contact",
    "gift_type",
    "gift_other",
    "gift_quantity",
    "gift_notes",
    "gift_history",
    "address",
    "address_number",
    "address_complement",
    "neighborhood",
    "city",
    "uf",
    "zip_code",
    "ignored_fields",
];

const CRM_SELECT_SQL: &str = "SELECT
    k.id AS id,
    k.client_id AS client_id,
    k.name AS name,
    k.role AS role,
    k.email AS email,
    k.phone AS phone,
    k.is_main_contact AS is_main_contact,
    k.gift_type AS gift_type,
    k.gift_other AS gift_other,
    k.gift_quantity AS gift_quantity,
    k.gift_notes AS gift_notes,
    k.gift_history AS gift_history,
    k.address AS address,
    k.address_number AS address_number,
    k.address_complement AS address_complement,
    k.neighborhood AS neighborhood,
    k.city AS city,
    k.uf AS uf,
    k.zip_code AS zip_code,
    k.ignored_fields AS ignored_fields,
    c.name AS client_name,
    c.partner_id AS partner_id,
    p.name AS partner_name
FROM crm_contacts k
JOIN clients c ON c.id = k.client_id
LEFT JOIN partners p ON p.id = c.partner_id";

/// Contact joined with the client and responsible partner it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmContactProfile {
    pub contact: CrmContact,
    pub client_name: String,
    pub partner_id: Option<EntityId>,
    pub partner_name: Option<String>,
}

/// Contact counts for the CRM dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrmSummary {
    pub total_contacts: i64,
    /// `None` key counts contacts with no gift type chosen.
    pub by_gift_type: Vec<(Option<GiftType>, i64)>,
    /// `None` key counts contacts whose client has no partner.
    pub by_partner: Vec<(Option<String>, i64)>,
}

pub trait CrmRepository {
    fn create_contact(&self, contact: &CrmContact) -> RepoResult<EntityId>;
    fn update_contact(&self, contact: &CrmContact) -> RepoResult<()>;
    fn get_contact(&self, id: EntityId) -> RepoResult<Option<CrmContactProfile>>;
    /// Lists contacts, optionally for one client, main contact first.
    fn list_contacts(&self, client_id: Option<EntityId>) -> RepoResult<Vec<CrmContactProfile>>;
    fn delete_contact(&self, id: EntityId) -> RepoResult<()>;
    /// Makes `id` the only main contact of its client.
    fn set_main_contact(&self, id: EntityId) -> RepoResult<()>;
    fn set_ignored_fields(&self, id: EntityId, labels: &[String]) -> RepoResult<()>;
    fn summary(&self) -> RepoResult<CrmSummary>;
}

pub struct SqliteCrmRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCrmRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "crm_contacts", &CRM_COLUMNS)?;
        Ok(Self { conn })
    }

    fn write_contact(&self, contact: &CrmContact, insert: bool) -> RepoResult<()> {
        contact.validate()?;
        let history = to_json(&contact.gift_history, "crm_contacts.gift_history")?;
        let ignored = to_json(&contact.ignored_fields, "crm_contacts.ignored_fields")?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let sql = if insert {
            "INSERT INTO crm_contacts (
                client_id, name, role, email, phone, is_main_contact,
                gift_type, gift_other, gift_quantity, gift_notes, gift_history,
                address, address_number, address_complement, neighborhood,
                city, uf, zip_code, ignored_fields, id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20);"
        } else {
            "UPDATE crm_contacts
             SET
                client_id = ?1,
                name = ?2,
                role = ?3,
                email = ?4,
                phone = ?5,
                is_main_contact = ?6,
                gift_type = ?7,
                gift_other = ?8,
                gift_quantity = ?9,
                gift_notes = ?10,
                gift_history = ?11,
                address = ?12,
                address_number = ?13,
                address_complement = ?14,
                neighborhood = ?15,
                city = ?16,
                uf = ?17,
                zip_code = ?18,
                ignored_fields = ?19,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?20;"
        };
        let changed = tx.execute(
            sql,
            params![
                contact.client_id.to_string(),
                contact.name.as_str(),
                contact.role.as_deref(),
                contact.email.as_deref(),
                contact.phone.as_deref(),
                bool_to_int(contact.is_main_contact),
                contact.gift_type.map(GiftType::label),
                contact.gift_other.as_deref(),
                contact.gift_quantity,
                contact.gift_notes.as_deref(),
                history,
                contact.address.as_deref(),
                contact.address_number.as_deref(),
                contact.address_complement.as_deref(),
                contact.neighborhood.as_deref(),
                contact.city.as_deref(),
                contact.uf.as_deref(),
                contact.zip_code.as_deref(),
                ignored,
                contact.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "crm_contact",
                id: contact.id,
            });
        }
        if contact.is_main_contact {
            clear_other_main_contacts(&tx, contact.client_id, contact.id)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn query_profiles(
        &self,
        sql: &str,
        bind: &[&dyn rusqlite::ToSql],
    ) -> RepoResult<Vec<CrmContactProfile>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind)?;
        let mut profiles = Vec::new();
        while let Some(row) = rows.next()? {
            profiles.push(parse_profile_row(row)?);
        }
        Ok(profiles)
    }
}

impl CrmRepository for SqliteCrmRepository<'_> {
    fn create_contact(&self, contact: &CrmContact) -> RepoResult<EntityId> {
        self.write_contact(contact, true)?;
        Ok(contact.id)
    }

    fn update_contact(&self, contact: &CrmContact) -> RepoResult<()> {
        self.write_contact(contact, false)
    }

    fn get_contact(&self, id: EntityId) -> RepoResult<Option<CrmContactProfile>> {
        let sql = format!("{CRM_SELECT_SQL} WHERE k.id = ?1;");
        let id_text = id.to_string();
        Ok(self.query_profiles(&sql, &[&id_text])?.into_iter().next())
    }

    fn list_contacts(&self, client_id: Option<EntityId>) -> RepoResult<Vec<CrmContactProfile>> {
        let sql = format!(
            "{CRM_SELECT_SQL}
             WHERE (?1 IS NULL OR k.client_id = ?1)
             ORDER BY c.name COLLATE NOCASE ASC, k.is_main_contact DESC, k.name COLLATE NOCASE ASC;"
        );
        let client_text = client_id.map(|id| id.to_string());
        self.query_profiles(&sql, &[&client_text])
    }

    fn delete_contact(&self, id: EntityId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM crm_contacts WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "crm_contact",
                id,
            });
        }
        Ok(())
    }

    fn set_main_contact(&self, id: EntityId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let client_text: Option<String> = tx
            .query_row(
                "SELECT client_id FROM crm_contacts WHERE id = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(client_text) = client_text else {
            return Err(RepoError::NotFound {
                entity: "crm_contact",
                id,
            });
        };
        let client_id = parse_uuid(&client_text, "crm_contacts.client_id")?;

        tx.execute(
            "UPDATE crm_contacts
             SET is_main_contact = 1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            [id.to_string()],
        )?;
        clear_other_main_contacts(&tx, client_id, id)?;
        tx.commit()?;
        Ok(())
    }

    fn set_ignored_fields(&self, id: EntityId, labels: &[String]) -> RepoResult<()> {
        let ignored = to_json(&labels, "crm_contacts.ignored_fields")?;
        let changed = self.conn.execute(
            "UPDATE crm_contacts
             SET ignored_fields = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), ignored],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "crm_contact",
                id,
            });
        }
        Ok(())
    }

    fn summary(&self) -> RepoResult<CrmSummary> {
        let total_contacts: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM crm_contacts;", [], |row| row.get(0))?;

        let mut by_gift_type = Vec::new();
        {
            let mut stmt = self.conn.prepare(
                "SELECT gift_type, COUNT(*) AS total
                 FROM crm_contacts
                 GROUP BY gift_type
                 ORDER BY total DESC, gift_type ASC;",
            )?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let gift = parse_gift_type(row.get::<_, Option<String>>(0)?)?;
                by_gift_type.push((gift, row.get(1)?));
            }
        }

        let mut by_partner = Vec::new();
        {
            let mut stmt = self.conn.prepare(
                "SELECT p.name, COUNT(*) AS total
                 FROM crm_contacts k
                 JOIN clients c ON c.id = k.client_id
                 LEFT JOIN partners p ON p.id = c.partner_id
                 GROUP BY p.id, p.name
                 ORDER BY total DESC, p.name COLLATE NOCASE ASC;",
            )?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                by_partner.push((row.get(0)?, row.get(1)?));
            }
        }

        Ok(CrmSummary {
            total_contacts,
            by_gift_type,
            by_partner,
        })
    }
}

fn clear_other_main_contacts(
    tx: &Transaction<'_>,
    client_id: EntityId,
    keep_id: EntityId,
) -> RepoResult<()> {
    tx.execute(
        "UPDATE crm_contacts
         SET is_main_contact = 0,
             updated_at = (strftime('%s', 'now') * 1000)
         WHERE client_id = ?1
           AND id <> ?2
           AND is_main_contact = 1;",
        params![client_id.to_string(), keep_id.to_string()],
    )?;
    Ok(())
}

fn parse_gift_type(value: Option<String>) -> RepoResult<Option<GiftType>> {
    match value {
        Some(text) => GiftType::parse(&text).map(Some).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid gift type `{text}` in crm_contacts.gift_type"
            ))
        }),
        None => Ok(None),
    }
}

fn parse_profile_row(row: &Row<'_>) -> RepoResult<CrmContactProfile> {
    let contact = CrmContact {
        id: get_uuid(row, "id")?,
        client_id: get_uuid(row, "client_id")?,
        name: row.get("name")?,
        role: row.get("role")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        is_main_contact: get_bool(row, "is_main_contact")?,
        gift_type: parse_gift_type(row.get("gift_type")?)?,
        gift_other: row.get("gift_other")?,
        gift_quantity: row.get("gift_quantity")?,
        gift_notes: row.get("gift_notes")?,
        gift_history: get_json(row, "gift_history")?,
        address: row.get("address")?,
        address_number: row.get("address_number")?,
        address_complement: row.get("address_complement")?,
        neighborhood: row.get("neighborhood")?,
        city: row.get("city")?,
        uf: row.get("uf")?,
        zip_code: row.get("zip_code")?,
        ignored_fields: get_json(row, "ignored_fields")?,
    };
    Ok(CrmContactProfile {
        contact,
        client_name: row.get("client_name")?,
        partner_id: get_optional_uuid(row, "partner_id")?,
        partner_name: row.get("partner_name")?,
    })
}
