use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::load::loaded;
use super::{Client, Requirement, User};

/// Status given to a project created without one.
pub const PROJECT_STATUS_NEW: &str = "NEW";
/// Terminal status set by the archive transition.
pub const PROJECT_STATUS_ARCHIVED: &str = "ARCHIVED";

/// An audit engagement for a client.
///
/// `client_name` is a display string kept alongside the optional `client_id`
/// link and is not synchronised with the client's own name. `status` is a free
/// string; [`PROJECT_STATUS_NEW`] and [`PROJECT_STATUS_ARCHIVED`] are the only
/// values the server itself assigns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub client_name: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn is_archived(&self) -> bool {
        self.status == PROJECT_STATUS_ARCHIVED
    }
}

/// Input for creating a new project.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectInput {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "clientName is required"))]
    pub client_name: String,
    pub client_id: Option<i64>,
    /// Initial status. Defaults to [`PROJECT_STATUS_NEW`] if not specified.
    pub status: Option<String>,
}

/// Input for updating an existing project. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectInput {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub client_name: Option<String>,
    pub status: Option<String>,
    pub client_id: Option<i64>,
}

/// Equality filters accepted when listing projects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFilter {
    pub status: Option<String>,
    pub client_id: Option<i64>,
}

/// A project with whichever of its client, users and requirements were loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<Client>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<User>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Vec<Requirement>>,
}

impl ProjectDetail {
    pub fn new(
        project: Project,
        client: Option<Client>,
        users: Vec<User>,
        requirements: Vec<Requirement>,
    ) -> Self {
        Self {
            project,
            client,
            users: loaded(users),
            requirements: loaded(requirements),
        }
    }
}

impl From<Project> for ProjectDetail {
    fn from(project: Project) -> Self {
        Self {
            project,
            client: None,
            users: None,
            requirements: None,
        }
    }
}
