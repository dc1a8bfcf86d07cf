use rusqlite::{Connection, OptionalExtension, Row};

use super::{now, parse_datetime, projects, users, Database};
use crate::error::{Error, Result};
use crate::models::*;

const CLIENT_COLUMNS: &str =
    "id, name, industry, contact_name, contact_email, created_at, updated_at";

fn client_from_row(row: &Row) -> rusqlite::Result<Client> {
    Ok(Client {
        id: row.get(0)?,
        name: row.get(1)?,
        industry: row.get(2)?,
        contact_name: row.get(3)?,
        contact_email: row.get(4)?,
        created_at: parse_datetime(row.get::<_, String>(5)?),
        updated_at: parse_datetime(row.get::<_, String>(6)?),
    })
}

pub(super) fn find_client(conn: &Connection, id: i64) -> Result<Option<Client>> {
    let client = conn
        .query_row(
            &format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ? AND deleted_at IS NULL"),
            [id],
            client_from_row,
        )
        .optional()?;
    Ok(client)
}

pub(super) fn require_client(conn: &Connection, id: i64) -> Result<Client> {
    find_client(conn, id)?.ok_or_else(|| Error::not_found("Client", id))
}

fn detail(conn: &Connection, client: Client, load: LoadSet) -> Result<ClientDetail> {
    let users = if load.contains(Relation::Users) {
        users::select_users(conn, &UserFilter {
            client_id: Some(client.id),
            ..Default::default()
        })?
    } else {
        Vec::new()
    };
    let projects = if load.contains(Relation::Projects) {
        projects::select_projects(conn, &ProjectFilter {
            client_id: Some(client.id),
            ..Default::default()
        })?
    } else {
        Vec::new()
    };
    Ok(ClientDetail::new(client, users, projects))
}

impl Database {
    // ============================================================
    // Client operations
    // ============================================================

    pub fn list_clients(&self, load: LoadSet) -> Result<Vec<ClientDetail>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE deleted_at IS NULL ORDER BY id"
        ))?;
        let clients = stmt
            .query_map([], client_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        clients
            .into_iter()
            .map(|client| detail(&conn, client, load))
            .collect()
    }

    pub fn get_client(&self, id: i64) -> Result<Client> {
        require_client(&self.conn(), id)
    }

    pub fn get_client_detail(&self, id: i64, load: LoadSet) -> Result<ClientDetail> {
        let conn = self.conn();
        let client = require_client(&conn, id)?;
        detail(&conn, client, load)
    }

    pub fn create_client(&self, input: CreateClientInput) -> Result<Client> {
        let conn = self.conn();
        let now = now();

        conn.execute(
            "INSERT INTO clients (name, industry, contact_name, contact_email, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                &input.name,
                &input.industry,
                &input.contact_name,
                &input.contact_email,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Client {
            id: conn.last_insert_rowid(),
            name: input.name,
            industry: input.industry,
            contact_name: input.contact_name,
            contact_email: input.contact_email,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_client(&self, id: i64, input: UpdateClientInput) -> Result<Client> {
        let conn = self.conn();
        let existing = require_client(&conn, id)?;
        let now = now();

        let client = Client {
            id,
            name: input.name.unwrap_or(existing.name),
            industry: input.industry.or(existing.industry),
            contact_name: input.contact_name.or(existing.contact_name),
            contact_email: input.contact_email.or(existing.contact_email),
            created_at: existing.created_at,
            updated_at: now,
        };

        conn.execute(
            "UPDATE clients SET name = ?, industry = ?, contact_name = ?, contact_email = ?, updated_at = ?
             WHERE id = ?",
            (
                &client.name,
                &client.industry,
                &client.contact_name,
                &client.contact_email,
                now.to_rfc3339(),
                id,
            ),
        )?;

        Ok(client)
    }

    /// Remove a client. Its users and projects survive with their client link cleared.
    pub fn delete_client(&self, id: i64) -> Result<()> {
        let conn = self.conn();
        let rows = conn.execute(
            "DELETE FROM clients WHERE id = ? AND deleted_at IS NULL",
            [id],
        )?;
        if rows == 0 {
            return Err(Error::not_found("Client", id));
        }
        Ok(())
    }
}
