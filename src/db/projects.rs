use rusqlite::{Connection, OptionalExtension, Row};

use super::{clients, now, parse_datetime, requirements, users, Database, Predicates};
use crate::error::{Error, Result};
use crate::models::*;

const PROJECT_COLUMNS: &str = "id, name, client_name, status, client_id, created_at, updated_at";

fn project_from_row(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        client_name: row.get(2)?,
        status: row.get(3)?,
        client_id: row.get(4)?,
        created_at: parse_datetime(row.get::<_, String>(5)?),
        updated_at: parse_datetime(row.get::<_, String>(6)?),
    })
}

pub(super) fn find_project(conn: &Connection, id: i64) -> Result<Option<Project>> {
    let project = conn
        .query_row(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ? AND deleted_at IS NULL"),
            [id],
            project_from_row,
        )
        .optional()?;
    Ok(project)
}

pub(super) fn require_project(conn: &Connection, id: i64) -> Result<Project> {
    find_project(conn, id)?.ok_or_else(|| Error::not_found("Project", id))
}

pub(super) fn select_projects(conn: &Connection, filter: &ProjectFilter) -> Result<Vec<Project>> {
    let predicates = Predicates::default()
        .eq("status", filter.status.clone())
        .eq("client_id", filter.client_id);

    let mut stmt = conn.prepare(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects WHERE deleted_at IS NULL{} ORDER BY id",
        predicates.sql()
    ))?;
    let projects = stmt
        .query_map(predicates.params().as_slice(), project_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(projects)
}

/// Projects a user is assigned to, through the association table.
pub(super) fn select_user_projects(conn: &Connection, user_id: i64) -> Result<Vec<Project>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.name, p.client_name, p.status, p.client_id, p.created_at, p.updated_at
         FROM projects p
         JOIN project_users pu ON pu.project_id = p.id
         WHERE pu.user_id = ? AND p.deleted_at IS NULL
         ORDER BY p.id",
    )?;
    let projects = stmt
        .query_map([user_id], project_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(projects)
}

fn detail(conn: &Connection, project: Project, load: LoadSet) -> Result<ProjectDetail> {
    let client = match project.client_id {
        Some(client_id) if load.contains(Relation::Client) => {
            clients::find_client(conn, client_id)?
        }
        _ => None,
    };
    let users = if load.contains(Relation::Users) {
        users::select_project_users(conn, project.id)?
    } else {
        Vec::new()
    };
    let requirements = if load.contains(Relation::Requirements) {
        requirements::select_requirements(conn, &RequirementFilter {
            project_id: Some(project.id),
            ..Default::default()
        })?
    } else {
        Vec::new()
    };
    Ok(ProjectDetail::new(project, client, users, requirements))
}

impl Database {
    // ============================================================
    // Project operations
    // ============================================================

    pub fn list_projects(&self, filter: &ProjectFilter, load: LoadSet) -> Result<Vec<ProjectDetail>> {
        let conn = self.conn();
        select_projects(&conn, filter)?
            .into_iter()
            .map(|project| detail(&conn, project, load))
            .collect()
    }

    pub fn get_project(&self, id: i64) -> Result<Project> {
        require_project(&self.conn(), id)
    }

    pub fn get_project_detail(&self, id: i64, load: LoadSet) -> Result<ProjectDetail> {
        let conn = self.conn();
        let project = require_project(&conn, id)?;
        detail(&conn, project, load)
    }

    /// Create a project with status `NEW` unless one is given. A supplied
    /// `client_id` must reference an existing client.
    pub fn create_project(&self, input: CreateProjectInput) -> Result<Project> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        if let Some(client_id) = input.client_id {
            clients::require_client(&tx, client_id)?;
        }

        let now = now();
        let status = input
            .status
            .unwrap_or_else(|| PROJECT_STATUS_NEW.to_string());

        tx.execute(
            "INSERT INTO projects (name, client_name, status, client_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                &input.name,
                &input.client_name,
                &status,
                input.client_id,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Project {
            id,
            name: input.name,
            client_name: input.client_name,
            status,
            client_id: input.client_id,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_project(&self, id: i64, input: UpdateProjectInput) -> Result<Project> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let existing = require_project(&tx, id)?;
        if let Some(client_id) = input.client_id {
            clients::require_client(&tx, client_id)?;
        }

        let now = now();
        let project = Project {
            id,
            name: input.name.unwrap_or(existing.name),
            client_name: input.client_name.unwrap_or(existing.client_name),
            status: input.status.unwrap_or(existing.status),
            client_id: input.client_id.or(existing.client_id),
            created_at: existing.created_at,
            updated_at: now,
        };

        tx.execute(
            "UPDATE projects SET name = ?, client_name = ?, status = ?, client_id = ?, updated_at = ?
             WHERE id = ?",
            (
                &project.name,
                &project.client_name,
                &project.status,
                project.client_id,
                now.to_rfc3339(),
                id,
            ),
        )?;
        tx.commit()?;

        Ok(project)
    }

    /// Move a project to `ARCHIVED`, whatever its current status. Archiving an
    /// archived project is a no-op apart from the timestamp.
    pub fn archive_project(&self, id: i64) -> Result<Project> {
        let project = self.update_project(
            id,
            UpdateProjectInput {
                status: Some(PROJECT_STATUS_ARCHIVED.to_string()),
                ..Default::default()
            },
        )?;
        tracing::info!(project_id = id, "Project archived");
        Ok(project)
    }

    /// Remove a project together with its requirements, their audit tasks and
    /// issues, and its user assignments.
    pub fn delete_project(&self, id: i64) -> Result<()> {
        let conn = self.conn();
        let rows = conn.execute(
            "DELETE FROM projects WHERE id = ? AND deleted_at IS NULL",
            [id],
        )?;
        if rows == 0 {
            return Err(Error::not_found("Project", id));
        }
        Ok(())
    }

    /// Projects belonging to a client.
    pub fn list_client_projects(&self, client_id: i64) -> Result<Vec<Project>> {
        let conn = self.conn();
        clients::require_client(&conn, client_id)?;
        select_projects(&conn, &ProjectFilter {
            client_id: Some(client_id),
            ..Default::default()
        })
    }

    /// Projects a user is assigned to.
    pub fn list_user_projects(&self, user_id: i64) -> Result<Vec<Project>> {
        let conn = self.conn();
        users::require_user(&conn, user_id)?;
        select_user_projects(&conn, user_id)
    }

    // ============================================================
    // Project <-> User assignment
    // ============================================================

    /// Link a user to a project. Linking an already linked pair succeeds and
    /// leaves a single association row.
    pub fn assign_user(&self, project_id: i64, user_id: i64) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        require_project(&tx, project_id)?;
        users::require_user(&tx, user_id)?;

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO project_users (project_id, user_id) VALUES (?, ?)",
            (project_id, user_id),
        )?;
        tx.commit()?;

        if inserted > 0 {
            tracing::info!(project_id, user_id, "User assigned to project");
        }
        Ok(())
    }

    /// Unlink a user from a project. Both must exist; a missing link is not an error.
    pub fn unassign_user(&self, project_id: i64, user_id: i64) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        require_project(&tx, project_id)?;
        users::require_user(&tx, user_id)?;

        let removed = tx.execute(
            "DELETE FROM project_users WHERE project_id = ? AND user_id = ?",
            (project_id, user_id),
        )?;
        tx.commit()?;

        if removed > 0 {
            tracing::info!(project_id, user_id, "User removed from project");
        }
        Ok(())
    }

    /// Number of association rows for a pair; 0 or 1.
    pub fn assignment_count(&self, project_id: i64, user_id: i64) -> Result<i64> {
        let count = self.conn().query_row(
            "SELECT COUNT(*) FROM project_users WHERE project_id = ? AND user_id = ?",
            (project_id, user_id),
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
