//! Collaborator repository contract and SQLite implementation.

use crate::model::collaborator::Collaborator;
use crate::model::EntityId;
use crate::repo::schema::{
    bool_to_int, ensure_connection_ready, get_bool, get_gender, get_optional_uuid, get_uuid,
    uuid_text,
};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const COLLABORATOR_COLUMNS: [&str; 16] = [
    "id",
    "name",
    "partner_id",
    "leader_id",
    "email",
    "phone",
    "cpf",
    "birthday",
    "gender",
    "role",
    "area",
    "hire_date",
    "termination_date",
    "oab_number",
    "oab_state",
    "active",
];

const COLLABORATOR_SELECT_SQL: &str = "SELECT
    id,
    name,
    partner_id,
    leader_id,
    email,
    phone,
    cpf,
    birthday,
    gender,
    role,
    area,
    hire_date,
    termination_date,
    oab_number,
    oab_state,
    active
FROM collaborators";

pub trait CollaboratorRepository {
    fn create_collaborator(&self, collaborator: &Collaborator) -> RepoResult<EntityId>;
    fn update_collaborator(&self, collaborator: &Collaborator) -> RepoResult<()>;
    fn get_collaborator(&self, id: EntityId) -> RepoResult<Option<Collaborator>>;
    fn list_collaborators(&self, active_only: bool) -> RepoResult<Vec<Collaborator>>;
    /// Direct reports of `leader_id`.
    fn list_team(&self, leader_id: EntityId) -> RepoResult<Vec<Collaborator>>;
    fn delete_collaborator(&self, id: EntityId) -> RepoResult<()>;
}

pub struct SqliteCollaboratorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCollaboratorRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "collaborators", &COLLABORATOR_COLUMNS)?;
        Ok(Self { conn })
    }

    fn query_many(&self, sql: &str, bind: &[&dyn rusqlite::ToSql]) -> RepoResult<Vec<Collaborator>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind)?;
        let mut collaborators = Vec::new();
        while let Some(row) = rows.next()? {
            collaborators.push(parse_collaborator_row(row)?);
        }
        Ok(collaborators)
    }
}

impl CollaboratorRepository for SqliteCollaboratorRepository<'_> {
    fn create_collaborator(&self, collaborator: &Collaborator) -> RepoResult<EntityId> {
        collaborator.validate()?;

        self.conn.execute(
            "INSERT INTO collaborators (
                id, name, partner_id, leader_id, email, phone, cpf, birthday,
                gender, role, area, hire_date, termination_date,
                oab_number, oab_state, active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16);",
            params![
                collaborator.id.to_string(),
                collaborator.name.as_str(),
                uuid_text(collaborator.partner_id),
                uuid_text(collaborator.leader_id),
                collaborator.email.as_deref(),
                collaborator.phone.as_deref(),
                collaborator.cpf.as_deref(),
                collaborator.birthday.as_deref(),
                collaborator.gender.map(|g| g.as_db()),
                collaborator.role.as_deref(),
                collaborator.area.as_deref(),
                collaborator.hire_date.as_deref(),
                collaborator.termination_date.as_deref(),
                collaborator.oab_number.as_deref(),
                collaborator.oab_state.as_deref(),
                bool_to_int(collaborator.active),
            ],
        )?;

        Ok(collaborator.id)
    }

    fn update_collaborator(&self, collaborator: &Collaborator) -> RepoResult<()> {
        collaborator.validate()?;

        let changed = self.conn.execute(
            "UPDATE collaborators
             SET
                name = ?1,
                partner_id = ?2,
                leader_id = ?3,
                email = ?4,
                phone = ?5,
                cpf = ?6,
                birthday = ?7,
                gender = ?8,
                role = ?9,
                area = ?10,
                hire_date = ?11,
                termination_date = ?12,
                oab_number = ?13,
                oab_state = ?14,
                active = ?15,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?16;",
            params![
                collaborator.name.as_str(),
                uuid_text(collaborator.partner_id),
                uuid_text(collaborator.leader_id),
                collaborator.email.as_deref(),
                collaborator.phone.as_deref(),
                collaborator.cpf.as_deref(),
                collaborator.birthday.as_deref(),
                collaborator.gender.map(|g| g.as_db()),
                collaborator.role.as_deref(),
                collaborator.area.as_deref(),
                collaborator.hire_date.as_deref(),
                collaborator.termination_date.as_deref(),
                collaborator.oab_number.as_deref(),
                collaborator.oab_state.as_deref(),
                bool_to_int(collaborator.active),
                collaborator.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "collaborator",
                id: collaborator.id,
            });
        }

        Ok(())
    }

    fn get_collaborator(&self, id: EntityId) -> RepoResult<Option<Collaborator>> {
        let sql = format!("{COLLABORATOR_SELECT_SQL} WHERE id = ?1;");
        let id_text = id.to_string();
        Ok(self.query_many(&sql, &[&id_text])?.into_iter().next())
    }

    fn list_collaborators(&self, active_only: bool) -> RepoResult<Vec<Collaborator>> {
        let sql = format!(
            "{COLLABORATOR_SELECT_SQL}
             WHERE (?1 = 0 OR active = 1)
             ORDER BY name COLLATE NOCASE ASC, id ASC;"
        );
        self.query_many(&sql, &[&bool_to_int(active_only)])
    }

    fn list_team(&self, leader_id: EntityId) -> RepoResult<Vec<Collaborator>> {
        let sql = format!(
            "{COLLABORATOR_SELECT_SQL}
             WHERE leader_id = ?1
             ORDER BY name COLLATE NOCASE ASC, id ASC;"
        );
        let leader_text = leader_id.to_string();
        self.query_many(&sql, &[&leader_text])
    }

    fn delete_collaborator(&self, id: EntityId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM collaborators WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "collaborator",
                id,
            });
        }
        Ok(())
    }
}

fn parse_collaborator_row(row: &Row<'_>) -> RepoResult<Collaborator> {
    Ok(Collaborator {
        id: get_uuid(row, "id")?,
        name: row.get("name")?,
        partner_id: get_optional_uuid(row, "partner_id")?,
        leader_id: get_optional_uuid(row, "leader_id")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        cpf: row.get("cpf")?,
        birthday: row.get("birthday")?,
        gender: get_gender(row, "gender")?,
        role: row.get("role")?,
        area: row.get("area")?,
        hire_date: row.get("hire_date")?,
        termination_date: row.get("termination_date")?,
        oab_number: row.get("oab_number")?,
        oab_state: row.get("oab_state")?,
        active: get_bool(row, "active")?,
    })
}
