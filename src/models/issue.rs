use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const ISSUE_STATUS_OPEN: &str = "OPEN";
pub const ISSUE_TYPE_DEFECT: &str = "DEFECT";

/// A finding raised by an audit task.
///
/// `status` and `issue_type` are free strings. Unset, they become
/// [`ISSUE_STATUS_OPEN`] and [`ISSUE_TYPE_DEFECT`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: i64,
    pub audit_task_id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate_hrs: Option<i64>,
    pub status: String,
    #[serde(rename = "type")]
    pub issue_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for raising an issue. The owning audit task comes from the route.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssueInput {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub phase: Option<String>,
    #[validate(range(min = 0, message = "estimateHrs must not be negative"))]
    pub estimate_hrs: Option<i64>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub issue_type: Option<String>,
}

/// Input for updating an existing issue. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIssueInput {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub phase: Option<String>,
    #[validate(range(min = 0, message = "estimateHrs must not be negative"))]
    pub estimate_hrs: Option<i64>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub issue_type: Option<String>,
}

/// Equality filters accepted when listing issues.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueFilter {
    pub audit_task_id: Option<i64>,
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_type_field_and_omits_unset_optionals() {
        let now = Utc::now();
        let issue = Issue {
            id: 1,
            audit_task_id: 2,
            title: "Login fails".to_string(),
            description: None,
            priority: Some("HIGH".to_string()),
            phase: None,
            estimate_hrs: None,
            status: ISSUE_STATUS_OPEN.to_string(),
            issue_type: ISSUE_TYPE_DEFECT.to_string(),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["type"], "DEFECT");
        assert_eq!(json["auditTaskId"], 2);
        assert_eq!(json["priority"], "HIGH");
        assert!(json.get("description").is_none());
        assert!(json.get("estimateHrs").is_none());
    }
}
