use rusqlite::{Connection, OptionalExtension, Row};

use super::{clients, now, parse_datetime, projects, Database, Predicates};
use crate::auth;
use crate::error::{Error, Result};
use crate::models::*;

const USER_COLUMNS: &str = "id, name, email, role, client_id, created_at, updated_at";

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        role: Role::from_str(&row.get::<_, String>(3)?).unwrap_or(Role::Client),
        client_id: row.get(4)?,
        created_at: parse_datetime(row.get::<_, String>(5)?),
        updated_at: parse_datetime(row.get::<_, String>(6)?),
    })
}

pub(super) fn find_user(conn: &Connection, id: i64) -> Result<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ? AND deleted_at IS NULL"),
            [id],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

pub(super) fn require_user(conn: &Connection, id: i64) -> Result<User> {
    find_user(conn, id)?.ok_or_else(|| Error::not_found("User", id))
}

pub(super) fn select_users(conn: &Connection, filter: &UserFilter) -> Result<Vec<User>> {
    let predicates = Predicates::default()
        .eq("client_id", filter.client_id)
        .eq("role", filter.role.map(|r| r.as_str()))
        .eq("email", filter.email.clone());

    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE deleted_at IS NULL{} ORDER BY id",
        predicates.sql()
    ))?;
    let users = stmt
        .query_map(predicates.params().as_slice(), user_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(users)
}

/// Users assigned to a project, through the association table.
pub(super) fn select_project_users(conn: &Connection, project_id: i64) -> Result<Vec<User>> {
    let mut stmt = conn.prepare(
        "SELECT u.id, u.name, u.email, u.role, u.client_id, u.created_at, u.updated_at
         FROM users u
         JOIN project_users pu ON pu.user_id = u.id
         WHERE pu.project_id = ? AND u.deleted_at IS NULL
         ORDER BY u.id",
    )?;
    let users = stmt
        .query_map([project_id], user_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(users)
}

fn detail(conn: &Connection, user: User, load: LoadSet) -> Result<UserDetail> {
    let client = match user.client_id {
        Some(client_id) if load.contains(Relation::Client) => {
            clients::find_client(conn, client_id)?
        }
        _ => None,
    };
    let projects = if load.contains(Relation::Projects) {
        projects::select_user_projects(conn, user.id)?
    } else {
        Vec::new()
    };
    Ok(UserDetail::new(user, client, projects))
}

fn hash_optional(password: Option<&str>) -> Result<Option<String>> {
    password.map(auth::hash_password).transpose()
}

impl Database {
    // ============================================================
    // User operations
    // ============================================================

    pub fn list_users(&self, filter: &UserFilter, load: LoadSet) -> Result<Vec<UserDetail>> {
        let conn = self.conn();
        select_users(&conn, filter)?
            .into_iter()
            .map(|user| detail(&conn, user, load))
            .collect()
    }

    pub fn get_user(&self, id: i64) -> Result<User> {
        require_user(&self.conn(), id)
    }

    pub fn get_user_detail(&self, id: i64, load: LoadSet) -> Result<UserDetail> {
        let conn = self.conn();
        let user = require_user(&conn, id)?;
        detail(&conn, user, load)
    }

    /// Create a user. A supplied `client_id` must reference an existing client.
    pub fn create_user(&self, input: CreateUserInput) -> Result<User> {
        let password_hash = hash_optional(input.password.as_deref())?;

        let mut conn = self.conn();
        let tx = conn.transaction()?;
        if let Some(client_id) = input.client_id {
            clients::require_client(&tx, client_id)?;
        }

        let now = now();
        tx.execute(
            "INSERT INTO users (name, email, password_hash, role, client_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                &input.name,
                &input.email,
                &password_hash,
                input.role.as_str(),
                input.client_id,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(User {
            id,
            name: input.name,
            email: input.email,
            role: input.role,
            client_id: input.client_id,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_user(&self, id: i64, input: UpdateUserInput) -> Result<User> {
        let password_hash = hash_optional(input.password.as_deref())?;

        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let existing = require_user(&tx, id)?;
        if let Some(client_id) = input.client_id {
            clients::require_client(&tx, client_id)?;
        }

        let now = now();
        let user = User {
            id,
            name: input.name.unwrap_or(existing.name),
            email: input.email.unwrap_or(existing.email),
            role: input.role.unwrap_or(existing.role),
            client_id: input.client_id.or(existing.client_id),
            created_at: existing.created_at,
            updated_at: now,
        };

        tx.execute(
            "UPDATE users SET name = ?, email = ?, role = ?, client_id = ?, updated_at = ? WHERE id = ?",
            (
                &user.name,
                &user.email,
                user.role.as_str(),
                user.client_id,
                now.to_rfc3339(),
                id,
            ),
        )?;
        if let Some(hash) = password_hash {
            tx.execute(
                "UPDATE users SET password_hash = ? WHERE id = ?",
                (&hash, id),
            )?;
        }
        tx.commit()?;

        Ok(user)
    }

    /// Remove a user. Their project assignments are removed with them.
    pub fn delete_user(&self, id: i64) -> Result<()> {
        let conn = self.conn();
        let rows = conn.execute("DELETE FROM users WHERE id = ? AND deleted_at IS NULL", [id])?;
        if rows == 0 {
            return Err(Error::not_found("User", id));
        }
        Ok(())
    }

    /// Users belonging to a client.
    pub fn list_client_users(&self, client_id: i64) -> Result<Vec<User>> {
        let conn = self.conn();
        clients::require_client(&conn, client_id)?;
        select_users(&conn, &UserFilter {
            client_id: Some(client_id),
            ..Default::default()
        })
    }

    /// Users assigned to a project, each with its client when `Relation::UsersClient` is loaded.
    pub fn list_project_users(&self, project_id: i64, load: LoadSet) -> Result<Vec<UserDetail>> {
        let conn = self.conn();
        projects::require_project(&conn, project_id)?;
        let nested = if load.contains(Relation::UsersClient) {
            LoadSet::NONE.with(Relation::Client)
        } else {
            LoadSet::NONE
        };
        select_project_users(&conn, project_id)?
            .into_iter()
            .map(|user| detail(&conn, user, nested))
            .collect()
    }

    /// Check a login attempt.
    ///
    /// Every failure, whether the email is unknown, the user has no password or
    /// the password is wrong, comes back as the same [`Error::Unauthorized`].
    pub fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let found = {
            let conn = self.conn();
            conn.query_row(
                &format!(
                    "SELECT {USER_COLUMNS}, password_hash FROM users
                     WHERE email = ? AND deleted_at IS NULL ORDER BY id LIMIT 1"
                ),
                [email],
                |row| Ok((user_from_row(row)?, row.get::<_, Option<String>>(7)?)),
            )
            .optional()?
        };

        let Some((user, Some(hash))) = found else {
            tracing::warn!("Login rejected");
            return Err(Error::Unauthorized);
        };

        match auth::verify_password(password, &hash) {
            Ok(true) => Ok(user),
            Ok(false) => {
                tracing::warn!(user_id = user.id, "Login rejected");
                Err(Error::Unauthorized)
            }
            Err(e) => {
                tracing::error!(user_id = user.id, error = %e, "Stored password hash is unreadable");
                Err(Error::Unauthorized)
            }
        }
    }
}
