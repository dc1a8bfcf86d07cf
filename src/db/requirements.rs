use rusqlite::{Connection, OptionalExtension, Row};

use super::{audit_tasks, now, parse_datetime, projects, Database, Predicates};
use crate::error::{Error, Result};
use crate::models::*;

const REQUIREMENT_COLUMNS: &str = "id, project_id, text, category, status, created_at, updated_at";

fn requirement_from_row(row: &Row) -> rusqlite::Result<Requirement> {
    Ok(Requirement {
        id: row.get(0)?,
        project_id: row.get(1)?,
        text: row.get(2)?,
        category: row.get(3)?,
        status: RequirementStatus::from_str(&row.get::<_, String>(4)?).unwrap_or_default(),
        created_at: parse_datetime(row.get::<_, String>(5)?),
        updated_at: parse_datetime(row.get::<_, String>(6)?),
    })
}

pub(super) fn find_requirement(conn: &Connection, id: i64) -> Result<Option<Requirement>> {
    let requirement = conn
        .query_row(
            &format!(
                "SELECT {REQUIREMENT_COLUMNS} FROM requirements WHERE id = ? AND deleted_at IS NULL"
            ),
            [id],
            requirement_from_row,
        )
        .optional()?;
    Ok(requirement)
}

pub(super) fn require_requirement(conn: &Connection, id: i64) -> Result<Requirement> {
    find_requirement(conn, id)?.ok_or_else(|| Error::not_found("Requirement", id))
}

pub(super) fn select_requirements(
    conn: &Connection,
    filter: &RequirementFilter,
) -> Result<Vec<Requirement>> {
    let predicates = Predicates::default()
        .eq("project_id", filter.project_id)
        .eq("status", filter.status.map(|s| s.as_str()));

    let mut stmt = conn.prepare(&format!(
        "SELECT {REQUIREMENT_COLUMNS} FROM requirements WHERE deleted_at IS NULL{} ORDER BY id",
        predicates.sql()
    ))?;
    let requirements = stmt
        .query_map(predicates.params().as_slice(), requirement_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(requirements)
}

fn detail(conn: &Connection, requirement: Requirement, load: LoadSet) -> Result<RequirementDetail> {
    let audit_tasks = if load.contains(Relation::AuditTasks) {
        audit_tasks::select_audit_tasks(conn, &AuditTaskFilter {
            requirement_id: Some(requirement.id),
            ..Default::default()
        })?
    } else {
        Vec::new()
    };
    Ok(RequirementDetail::new(requirement, audit_tasks))
}

impl Database {
    // ============================================================
    // Requirement operations
    // ============================================================

    pub fn list_requirements(
        &self,
        filter: &RequirementFilter,
        load: LoadSet,
    ) -> Result<Vec<RequirementDetail>> {
        let conn = self.conn();
        select_requirements(&conn, filter)?
            .into_iter()
            .map(|requirement| detail(&conn, requirement, load))
            .collect()
    }

    /// Requirements of one project. Fails with `NotFound` if the project does not exist.
    pub fn list_project_requirements(
        &self,
        project_id: i64,
        load: LoadSet,
    ) -> Result<Vec<RequirementDetail>> {
        let conn = self.conn();
        projects::require_project(&conn, project_id)?;
        select_requirements(&conn, &RequirementFilter {
            project_id: Some(project_id),
            ..Default::default()
        })?
        .into_iter()
        .map(|requirement| detail(&conn, requirement, load))
        .collect()
    }

    pub fn get_requirement(&self, id: i64) -> Result<Requirement> {
        require_requirement(&self.conn(), id)
    }

    pub fn get_requirement_detail(&self, id: i64, load: LoadSet) -> Result<RequirementDetail> {
        let conn = self.conn();
        let requirement = require_requirement(&conn, id)?;
        detail(&conn, requirement, load)
    }

    /// Create a requirement under a project, `NOT_MET` unless a status is given.
    ///
    /// The project lookup and the insert share one transaction; a missing project
    /// fails with `NotFound` and nothing is written.
    pub fn create_requirement(
        &self,
        project_id: i64,
        input: CreateRequirementInput,
    ) -> Result<Requirement> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        projects::require_project(&tx, project_id)?;

        let now = now();
        let status = input.status.unwrap_or_default();

        tx.execute(
            "INSERT INTO requirements (project_id, text, category, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                project_id,
                &input.text,
                &input.category,
                status.as_str(),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Requirement {
            id,
            project_id,
            text: input.text,
            category: input.category,
            status,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_requirement(&self, id: i64, input: UpdateRequirementInput) -> Result<Requirement> {
        let conn = self.conn();
        let existing = require_requirement(&conn, id)?;
        let now = now();

        let requirement = Requirement {
            id,
            project_id: existing.project_id,
            text: input.text.unwrap_or(existing.text),
            category: input.category.or(existing.category),
            status: input.status.unwrap_or(existing.status),
            created_at: existing.created_at,
            updated_at: now,
        };

        conn.execute(
            "UPDATE requirements SET text = ?, category = ?, status = ?, updated_at = ? WHERE id = ?",
            (
                &requirement.text,
                &requirement.category,
                requirement.status.as_str(),
                now.to_rfc3339(),
                id,
            ),
        )?;

        Ok(requirement)
    }

    /// Remove a requirement together with its audit tasks and their issues.
    pub fn delete_requirement(&self, id: i64) -> Result<()> {
        let conn = self.conn();
        let rows = conn.execute(
            "DELETE FROM requirements WHERE id = ? AND deleted_at IS NULL",
            [id],
        )?;
        if rows == 0 {
            return Err(Error::not_found("Requirement", id));
        }
        Ok(())
    }
}
