use rusqlite::{Connection, OptionalExtension};

use super::{now, Database};
use crate::error::Result;
use crate::models::*;

/// Tables in the order they are seeded, parents first.
const SEEDED_TABLES: [&str; 6] = [
    "clients",
    "users",
    "projects",
    "requirements",
    "audit_tasks",
    "issues",
];

fn is_empty(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })?;
    Ok(count == 0)
}

fn first_id(conn: &Connection, table: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            &format!("SELECT id FROM {table} WHERE deleted_at IS NULL ORDER BY id LIMIT 1"),
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

impl Database {
    /// Insert demo rows into every table that is empty.
    ///
    /// Each table is considered on its own, so a database that already has
    /// clients but no issues only gets the demo issue. Children hang off the
    /// lowest-id row of their parent table. Returns the names of the tables
    /// that were seeded.
    pub fn seed(&self) -> Result<Vec<&'static str>> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let ts = now().to_rfc3339();
        let mut seeded = Vec::new();

        for table in SEEDED_TABLES {
            if !is_empty(&tx, table)? {
                continue;
            }

            let inserted = match table {
                "clients" => tx.execute(
                    "INSERT INTO clients (name, created_at, updated_at) VALUES (?, ?, ?)",
                    ("Demo Client Org", &ts, &ts),
                )?,
                "users" => tx.execute(
                    "INSERT INTO users (name, email, role, client_id, created_at, updated_at)
                     VALUES (?, ?, ?, ?, ?, ?)",
                    (
                        "Alice",
                        "alice@example.com",
                        Role::Consultant.as_str(),
                        first_id(&tx, "clients")?,
                        &ts,
                        &ts,
                    ),
                )?,
                "projects" => tx.execute(
                    "INSERT INTO projects (name, client_name, status, client_id, created_at, updated_at)
                     VALUES (?, ?, ?, ?, ?, ?)",
                    (
                        "Demo Project",
                        "Demo Client",
                        PROJECT_STATUS_NEW,
                        first_id(&tx, "clients")?,
                        &ts,
                        &ts,
                    ),
                )?,
                "requirements" => match first_id(&tx, "projects")? {
                    Some(project_id) => tx.execute(
                        "INSERT INTO requirements (project_id, text, category, status, created_at, updated_at)
                         VALUES (?, ?, ?, ?, ?, ?)",
                        (
                            project_id,
                            "Must support single sign-on",
                            "Authentication",
                            RequirementStatus::Draft.as_str(),
                            &ts,
                            &ts,
                        ),
                    )?,
                    None => 0,
                },
                "audit_tasks" => match first_id(&tx, "requirements")? {
                    Some(requirement_id) => tx.execute(
                        "INSERT INTO audit_tasks (requirement_id, text, status, notes, created_at, updated_at)
                         VALUES (?, ?, ?, ?, ?, ?)",
                        (
                            requirement_id,
                            "Check login audit",
                            AUDIT_TASK_STATUS_PENDING,
                            "Review all login-related requirements",
                            &ts,
                            &ts,
                        ),
                    )?,
                    None => 0,
                },
                "issues" => match first_id(&tx, "audit_tasks")? {
                    Some(audit_task_id) => tx.execute(
                        "INSERT INTO issues (audit_task_id, title, description, status, type, created_at, updated_at)
                         VALUES (?, ?, ?, ?, ?, ?, ?)",
                        (
                            audit_task_id,
                            "Login fails on Safari",
                            "Users report login page broken in Safari",
                            ISSUE_STATUS_OPEN,
                            ISSUE_TYPE_DEFECT,
                            &ts,
                            &ts,
                        ),
                    )?,
                    None => 0,
                },
                _ => 0,
            };

            if inserted > 0 {
                seeded.push(table);
            }
        }

        // The demo user works on the demo project.
        if seeded.contains(&"users") || seeded.contains(&"projects") {
            if let (Some(project_id), Some(user_id)) =
                (first_id(&tx, "projects")?, first_id(&tx, "users")?)
            {
                tx.execute(
                    "INSERT OR IGNORE INTO project_users (project_id, user_id) VALUES (?, ?)",
                    (project_id, user_id),
                )?;
            }
        }

        tx.commit()?;

        if seeded.is_empty() {
            tracing::debug!("Seed data already present");
        } else {
            tracing::info!(tables = ?seeded, "Seeded demo data");
        }
        Ok(seeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migrated() -> Database {
        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    #[test]
    fn seeds_a_connected_chain() {
        let db = migrated();

        let seeded = db.seed().unwrap();
        assert_eq!(seeded, SEEDED_TABLES.to_vec());

        let project = db.get_project(1).unwrap();
        assert_eq!(project.name, "Demo Project");
        assert_eq!(project.status, PROJECT_STATUS_NEW);
        assert_eq!(project.client_id, Some(1));

        let requirement = db.get_requirement(1).unwrap();
        assert_eq!(requirement.project_id, project.id);
        assert_eq!(requirement.status, RequirementStatus::Draft);
        assert_eq!(requirement.category.as_deref(), Some("Authentication"));

        let issue = db.get_issue(1).unwrap();
        assert_eq!(issue.audit_task_id, 1);
        assert_eq!(issue.status, ISSUE_STATUS_OPEN);
        assert_eq!(db.assignment_count(1, 1).unwrap(), 1);
    }

    #[test]
    fn seeding_twice_adds_nothing() {
        let db = migrated();
        db.seed().unwrap();

        assert!(db.seed().unwrap().is_empty());
        assert_eq!(db.list_clients(LoadSet::NONE).unwrap().len(), 1);
    }

    #[test]
    fn only_empty_tables_are_seeded() {
        let db = migrated();
        db.create_client(CreateClientInput {
            name: "Acme".to_string(),
            industry: None,
            contact_name: None,
            contact_email: None,
        })
        .unwrap();

        let seeded = db.seed().unwrap();

        assert!(!seeded.contains(&"clients"));
        assert_eq!(db.get_user(1).unwrap().client_id, Some(1));
        assert_eq!(db.get_client(1).unwrap().name, "Acme");
    }
}
