use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Issue;

/// Status given to an audit task created without one.
pub const AUDIT_TASK_STATUS_PENDING: &str = "PENDING";

/// A check performed against a requirement.
///
/// `status` is a free string; the server only ever assigns
/// [`AUDIT_TASK_STATUS_PENDING`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditTask {
    pub id: i64,
    pub requirement_id: i64,
    pub text: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an audit task. The owning requirement comes from the route.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuditTaskInput {
    #[validate(length(min = 1, message = "text is required"))]
    pub text: String,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Input for updating an existing audit task. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuditTaskInput {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Equality filters accepted when listing audit tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditTaskFilter {
    pub requirement_id: Option<i64>,
    pub status: Option<String>,
}

/// An audit task with its issue, when loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditTaskDetail {
    #[serde(flatten)]
    pub audit_task: AuditTask,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<Issue>,
}

impl From<AuditTask> for AuditTaskDetail {
    fn from(audit_task: AuditTask) -> Self {
        Self {
            audit_task,
            issue: None,
        }
    }
}
