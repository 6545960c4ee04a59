//! Partner repository contract and SQLite implementation.

use crate::model::partner::Partner;
use crate::model::EntityId;
use crate::repo::schema::{
    bool_to_int, ensure_connection_ready, get_bool, get_gender, get_uuid,
};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const PARTNER_COLUMNS: [&str; 11] = [
    "id",
    "name",
    "email",
    "phone",
    "cpf",
    "gender",
    "civil_status",
    "nationality",
    "oab_number",
    "oab_state",
    "active",
];

const PARTNER_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    phone,
    cpf,
    gender,
    civil_status,
    nationality,
    oab_number,
    oab_state,
    active
FROM partners";

pub trait PartnerRepository {
    fn create_partner(&self, partner: &Partner) -> RepoResult<EntityId>;
    fn update_partner(&self, partner: &Partner) -> RepoResult<()>;
    fn get_partner(&self, id: EntityId) -> RepoResult<Option<Partner>>;
    /// Lists partners by name; `active_only` hides inactive ones.
    fn list_partners(&self, active_only: bool) -> RepoResult<Vec<Partner>>;
    fn delete_partner(&self, id: EntityId) -> RepoResult<()>;
}

pub struct SqlitePartnerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePartnerRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "partners", &PARTNER_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl PartnerRepository for SqlitePartnerRepository<'_> {
    fn create_partner(&self, partner: &Partner) -> RepoResult<EntityId> {
        partner.validate()?;

        self.conn.execute(
            "INSERT INTO partners (
                id, name, email, phone, cpf, gender,
                civil_status, nationality, oab_number, oab_state, active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                partner.id.to_string(),
                partner.name.as_str(),
                partner.email.as_deref(),
                partner.phone.as_deref(),
                partner.cpf.as_deref(),
                partner.gender.map(|g| g.as_db()),
                partner.civil_status.as_deref(),
                partner.nationality.as_deref(),
                partner.oab_number.as_deref(),
                partner.oab_state.as_deref(),
                bool_to_int(partner.active),
            ],
        )?;

        Ok(partner.id)
    }

    fn update_partner(&self, partner: &Partner) -> RepoResult<()> {
        partner.validate()?;

        let changed = self.conn.execute(
            "UPDATE partners
             SET
                name = ?1,
                email = ?2,
                phone = ?3,
                cpf = ?4,
                gender = ?5,
                civil_status = ?6,
                nationality = ?7,
                oab_number = ?8,
                oab_state = ?9,
                active = ?10,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?11;",
            params![
                partner.name.as_str(),
                partner.email.as_deref(),
                partner.phone.as_deref(),
                partner.cpf.as_deref(),
                partner.gender.map(|g| g.as_db()),
                partner.civil_status.as_deref(),
                partner.nationality.as_deref(),
                partner.oab_number.as_deref(),
                partner.oab_state.as_deref(),
                bool_to_int(partner.active),
                partner.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "partner",
                id: partner.id,
            });
        }

        Ok(())
    }

    fn get_partner(&self, id: EntityId) -> RepoResult<Option<Partner>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PARTNER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_partner_row(row)?));
        }
        Ok(None)
    }

    fn list_partners(&self, active_only: bool) -> RepoResult<Vec<Partner>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PARTNER_SELECT_SQL}
             WHERE (?1 = 0 OR active = 1)
             ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([bool_to_int(active_only)])?;
        let mut partners = Vec::new();
        while let Some(row) = rows.next()? {
            partners.push(parse_partner_row(row)?);
        }
        Ok(partners)
    }

    fn delete_partner(&self, id: EntityId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM partners WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "partner",
                id,
            });
        }
        Ok(())
    }
}

fn parse_partner_row(row: &Row<'_>) -> RepoResult<Partner> {
    let partner = Partner {
        id: get_uuid(row, "id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        cpf: row.get("cpf")?,
        gender: get_gender(row, "gender")?,
        civil_status: row.get("civil_status")?,
        nationality: row.get("nationality")?,
        oab_number: row.get("oab_number")?,
        oab_state: row.get("oab_state")?,
        active: get_bool(row, "active")?,
    };
    Ok(partner)
}
