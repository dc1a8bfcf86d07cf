use rusqlite::{Connection, OptionalExtension, Row};

use super::{issues, now, parse_datetime, requirements, Database, Predicates};
use crate::error::{Error, Result};
use crate::models::*;

const AUDIT_TASK_COLUMNS: &str = "id, requirement_id, text, status, notes, created_at, updated_at";

fn audit_task_from_row(row: &Row) -> rusqlite::Result<AuditTask> {
    Ok(AuditTask {
        id: row.get(0)?,
        requirement_id: row.get(1)?,
        text: row.get(2)?,
        status: row.get(3)?,
        notes: row.get(4)?,
        created_at: parse_datetime(row.get::<_, String>(5)?),
        updated_at: parse_datetime(row.get::<_, String>(6)?),
    })
}

pub(super) fn find_audit_task(conn: &Connection, id: i64) -> Result<Option<AuditTask>> {
    let task = conn
        .query_row(
            &format!(
                "SELECT {AUDIT_TASK_COLUMNS} FROM audit_tasks WHERE id = ? AND deleted_at IS NULL"
            ),
            [id],
            audit_task_from_row,
        )
        .optional()?;
    Ok(task)
}

pub(super) fn require_audit_task(conn: &Connection, id: i64) -> Result<AuditTask> {
    find_audit_task(conn, id)?.ok_or_else(|| Error::not_found("Audit task", id))
}

pub(super) fn select_audit_tasks(
    conn: &Connection,
    filter: &AuditTaskFilter,
) -> Result<Vec<AuditTask>> {
    let predicates = Predicates::default()
        .eq("requirement_id", filter.requirement_id)
        .eq("status", filter.status.clone());

    let mut stmt = conn.prepare(&format!(
        "SELECT {AUDIT_TASK_COLUMNS} FROM audit_tasks WHERE deleted_at IS NULL{} ORDER BY id",
        predicates.sql()
    ))?;
    let tasks = stmt
        .query_map(predicates.params().as_slice(), audit_task_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tasks)
}

fn detail(conn: &Connection, audit_task: AuditTask, load: LoadSet) -> Result<AuditTaskDetail> {
    let issue = if load.contains(Relation::Issue) {
        issues::first_issue_for_task(conn, audit_task.id)?
    } else {
        None
    };
    Ok(AuditTaskDetail { audit_task, issue })
}

impl Database {
    // ============================================================
    // Audit task operations
    // ============================================================

    pub fn list_audit_tasks(
        &self,
        filter: &AuditTaskFilter,
        load: LoadSet,
    ) -> Result<Vec<AuditTaskDetail>> {
        let conn = self.conn();
        select_audit_tasks(&conn, filter)?
            .into_iter()
            .map(|task| detail(&conn, task, load))
            .collect()
    }

    /// Audit tasks of one requirement. Fails with `NotFound` if the requirement does not exist.
    pub fn list_requirement_audit_tasks(
        &self,
        requirement_id: i64,
        load: LoadSet,
    ) -> Result<Vec<AuditTaskDetail>> {
        let conn = self.conn();
        requirements::require_requirement(&conn, requirement_id)?;
        select_audit_tasks(&conn, &AuditTaskFilter {
            requirement_id: Some(requirement_id),
            ..Default::default()
        })?
        .into_iter()
        .map(|task| detail(&conn, task, load))
        .collect()
    }

    pub fn get_audit_task(&self, id: i64) -> Result<AuditTask> {
        require_audit_task(&self.conn(), id)
    }

    pub fn get_audit_task_detail(&self, id: i64, load: LoadSet) -> Result<AuditTaskDetail> {
        let conn = self.conn();
        let task = require_audit_task(&conn, id)?;
        detail(&conn, task, load)
    }

    /// Create an audit task under a requirement, `PENDING` unless a status is given.
    pub fn create_audit_task(
        &self,
        requirement_id: i64,
        input: CreateAuditTaskInput,
    ) -> Result<AuditTask> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        requirements::require_requirement(&tx, requirement_id)?;

        let now = now();
        let status = input
            .status
            .unwrap_or_else(|| AUDIT_TASK_STATUS_PENDING.to_string());

        tx.execute(
            "INSERT INTO audit_tasks (requirement_id, text, status, notes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                requirement_id,
                &input.text,
                &status,
                &input.notes,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(AuditTask {
            id,
            requirement_id,
            text: input.text,
            status,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_audit_task(&self, id: i64, input: UpdateAuditTaskInput) -> Result<AuditTask> {
        let conn = self.conn();
        let existing = require_audit_task(&conn, id)?;
        let now = now();

        let task = AuditTask {
            id,
            requirement_id: existing.requirement_id,
            text: input.text.unwrap_or(existing.text),
            status: input.status.unwrap_or(existing.status),
            notes: input.notes.or(existing.notes),
            created_at: existing.created_at,
            updated_at: now,
        };

        conn.execute(
            "UPDATE audit_tasks SET text = ?, status = ?, notes = ?, updated_at = ? WHERE id = ?",
            (&task.text, &task.status, &task.notes, now.to_rfc3339(), id),
        )?;

        Ok(task)
    }

    /// Remove an audit task together with its issue.
    pub fn delete_audit_task(&self, id: i64) -> Result<()> {
        let conn = self.conn();
        let rows = conn.execute(
            "DELETE FROM audit_tasks WHERE id = ? AND deleted_at IS NULL",
            [id],
        )?;
        if rows == 0 {
            return Err(Error::not_found("Audit task", id));
        }
        Ok(())
    }
}
