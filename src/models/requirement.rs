use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::load::loaded;
use super::AuditTask;

/// Something a project must satisfy, checked by audit tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub id: i64,
    pub project_id: i64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub status: RequirementStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Whether a requirement has been satisfied.
///
/// - `Draft`: Not yet agreed with the client (used by seed data)
/// - `NotMet`: Agreed but not yet satisfied; the default
/// - `Met`: Satisfied
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequirementStatus {
    Draft,
    #[default]
    NotMet,
    Met,
}

impl RequirementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::NotMet => "NOT_MET",
            Self::Met => "MET",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(Self::Draft),
            "NOT_MET" => Some(Self::NotMet),
            "MET" => Some(Self::Met),
            _ => None,
        }
    }
}

/// Input for creating a requirement. The owning project comes from the route.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequirementInput {
    #[validate(length(min = 1, message = "text is required"))]
    pub text: String,
    pub category: Option<String>,
    /// Initial status. Defaults to [`RequirementStatus::NotMet`] if not specified.
    pub status: Option<RequirementStatus>,
}

/// Input for updating an existing requirement. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequirementInput {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: Option<String>,
    pub category: Option<String>,
    pub status: Option<RequirementStatus>,
}

/// Equality filters accepted when listing requirements.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementFilter {
    pub project_id: Option<i64>,
    pub status: Option<RequirementStatus>,
}

/// A requirement with its audit tasks, when loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementDetail {
    #[serde(flatten)]
    pub requirement: Requirement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_tasks: Option<Vec<AuditTask>>,
}

impl RequirementDetail {
    pub fn new(requirement: Requirement, audit_tasks: Vec<AuditTask>) -> Self {
        Self {
            requirement,
            audit_tasks: loaded(audit_tasks),
        }
    }
}

impl From<Requirement> for RequirementDetail {
    fn from(requirement: Requirement) -> Self {
        Self {
            requirement,
            audit_tasks: None,
        }
    }
}

/// Outcome of a CSV requirements upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementImport {
    pub message: String,
    pub count: usize,
    pub requirements: Vec<Requirement>,
}

impl From<Vec<Requirement>> for RequirementImport {
    fn from(requirements: Vec<Requirement>) -> Self {
        Self {
            message: "Requirements uploaded successfully".to_string(),
            count: requirements.len(),
            requirements,
        }
    }
}
