use rusqlite::{Connection, OptionalExtension, Row};

use super::{audit_tasks, now, parse_datetime, projects, Database, Predicates};
use crate::error::{Error, Result};
use crate::models::*;

const ISSUE_COLUMNS: &str = "id, audit_task_id, title, description, priority, phase, estimate_hrs, \
                             status, type, created_at, updated_at";

fn issue_from_row(row: &Row) -> rusqlite::Result<Issue> {
    Ok(Issue {
        id: row.get(0)?,
        audit_task_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        priority: row.get(4)?,
        phase: row.get(5)?,
        estimate_hrs: row.get(6)?,
        status: row.get(7)?,
        issue_type: row.get(8)?,
        created_at: parse_datetime(row.get::<_, String>(9)?),
        updated_at: parse_datetime(row.get::<_, String>(10)?),
    })
}

fn require_issue(conn: &Connection, id: i64) -> Result<Issue> {
    conn.query_row(
        &format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id = ? AND deleted_at IS NULL"),
        [id],
        issue_from_row,
    )
    .optional()?
    .ok_or_else(|| Error::not_found("Issue", id))
}

fn select_issues(conn: &Connection, filter: &IssueFilter) -> Result<Vec<Issue>> {
    let predicates = Predicates::default()
        .eq("audit_task_id", filter.audit_task_id)
        .eq("status", filter.status.clone());

    let mut stmt = conn.prepare(&format!(
        "SELECT {ISSUE_COLUMNS} FROM issues WHERE deleted_at IS NULL{} ORDER BY id",
        predicates.sql()
    ))?;
    let issues = stmt
        .query_map(predicates.params().as_slice(), issue_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(issues)
}

/// The issue an audit task owns. Should more than one exist, the oldest wins.
pub(super) fn first_issue_for_task(conn: &Connection, audit_task_id: i64) -> Result<Option<Issue>> {
    let issue = conn
        .query_row(
            &format!(
                "SELECT {ISSUE_COLUMNS} FROM issues
                 WHERE audit_task_id = ? AND deleted_at IS NULL ORDER BY id LIMIT 1"
            ),
            [audit_task_id],
            issue_from_row,
        )
        .optional()?;
    Ok(issue)
}

impl Database {
    // ============================================================
    // Issue operations
    // ============================================================

    pub fn list_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        select_issues(&self.conn(), filter)
    }

    /// Issues of one audit task. Fails with `NotFound` if the audit task does not exist.
    pub fn list_audit_task_issues(&self, audit_task_id: i64) -> Result<Vec<Issue>> {
        let conn = self.conn();
        audit_tasks::require_audit_task(&conn, audit_task_id)?;
        select_issues(&conn, &IssueFilter {
            audit_task_id: Some(audit_task_id),
            ..Default::default()
        })
    }

    /// Every issue raised anywhere under a project, via its requirements and audit tasks.
    pub fn list_project_issues(&self, project_id: i64) -> Result<Vec<Issue>> {
        let conn = self.conn();
        projects::require_project(&conn, project_id)?;

        let mut stmt = conn.prepare(
            "SELECT i.id, i.audit_task_id, i.title, i.description, i.priority, i.phase,
                    i.estimate_hrs, i.status, i.type, i.created_at, i.updated_at
             FROM issues i
             JOIN audit_tasks t ON t.id = i.audit_task_id AND t.deleted_at IS NULL
             JOIN requirements r ON r.id = t.requirement_id AND r.deleted_at IS NULL
             WHERE r.project_id = ? AND i.deleted_at IS NULL
             ORDER BY i.id",
        )?;
        let issues = stmt
            .query_map([project_id], issue_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(issues)
    }

    pub fn get_issue(&self, id: i64) -> Result<Issue> {
        require_issue(&self.conn(), id)
    }

    /// Raise an issue on an audit task. Status defaults to `OPEN`, type to `DEFECT`.
    pub fn create_issue(&self, audit_task_id: i64, input: CreateIssueInput) -> Result<Issue> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        audit_tasks::require_audit_task(&tx, audit_task_id)?;

        let now = now();
        let status = input
            .status
            .unwrap_or_else(|| ISSUE_STATUS_OPEN.to_string());
        let issue_type = input
            .issue_type
            .unwrap_or_else(|| ISSUE_TYPE_DEFECT.to_string());

        tx.execute(
            "INSERT INTO issues (audit_task_id, title, description, priority, phase, estimate_hrs,
                                 status, type, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                audit_task_id,
                &input.title,
                &input.description,
                &input.priority,
                &input.phase,
                input.estimate_hrs,
                &status,
                &issue_type,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Issue {
            id,
            audit_task_id,
            title: input.title,
            description: input.description,
            priority: input.priority,
            phase: input.phase,
            estimate_hrs: input.estimate_hrs,
            status,
            issue_type,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_issue(&self, id: i64, input: UpdateIssueInput) -> Result<Issue> {
        let conn = self.conn();
        let existing = require_issue(&conn, id)?;
        let now = now();

        let issue = Issue {
            id,
            audit_task_id: existing.audit_task_id,
            title: input.title.unwrap_or(existing.title),
            description: input.description.or(existing.description),
            priority: input.priority.or(existing.priority),
            phase: input.phase.or(existing.phase),
            estimate_hrs: input.estimate_hrs.or(existing.estimate_hrs),
            status: input.status.unwrap_or(existing.status),
            issue_type: input.issue_type.unwrap_or(existing.issue_type),
            created_at: existing.created_at,
            updated_at: now,
        };

        conn.execute(
            "UPDATE issues SET title = ?, description = ?, priority = ?, phase = ?, estimate_hrs = ?,
                               status = ?, type = ?, updated_at = ?
             WHERE id = ?",
            (
                &issue.title,
                &issue.description,
                &issue.priority,
                &issue.phase,
                issue.estimate_hrs,
                &issue.status,
                &issue.issue_type,
                now.to_rfc3339(),
                id,
            ),
        )?;

        Ok(issue)
    }

    pub fn delete_issue(&self, id: i64) -> Result<()> {
        let conn = self.conn();
        let rows = conn.execute("DELETE FROM issues WHERE id = ? AND deleted_at IS NULL", [id])?;
        if rows == 0 {
            return Err(Error::not_found("Issue", id));
        }
        Ok(())
    }
}
