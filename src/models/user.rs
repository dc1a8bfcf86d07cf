use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::load::loaded;
use super::{Client, Project};

/// A person who works on or is audited within projects.
///
/// The password hash is kept out of this type on purpose; it never leaves the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fixed set of user roles.
///
/// - `Admin`: Full access to every client and project
/// - `Consultant`: Performs audits on assigned projects
/// - `Client`: A member of the audited organisation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Consultant,
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Consultant => "CONSULTANT",
            Self::Client => "CLIENT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ADMIN" => Some(Self::Admin),
            "CONSULTANT" => Some(Self::Consultant),
            "CLIENT" => Some(Self::Client),
            _ => None,
        }
    }
}

/// Input for creating a new user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    pub role: Role,
    pub client_id: Option<i64>,
    /// Plaintext password. Hashed before it is stored; users without one cannot log in.
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: Option<String>,
}

/// Input for updating an existing user. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    pub role: Option<Role>,
    pub client_id: Option<i64>,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: Option<String>,
}

/// Equality filters accepted when listing users.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilter {
    pub client_id: Option<i64>,
    pub role: Option<Role>,
    pub email: Option<String>,
}

/// A user with whichever of its client and projects were loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<Client>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<Project>>,
}

impl UserDetail {
    pub fn new(user: User, client: Option<Client>, projects: Vec<Project>) -> Self {
        Self {
            user,
            client,
            projects: loaded(projects),
        }
    }
}

impl From<User> for UserDetail {
    fn from(user: User) -> Self {
        Self {
            user,
            client: None,
            projects: None,
        }
    }
}

/// Credentials posted to the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Opaque placeholder token. It is not signed and cannot be verified.
    pub token: String,
    pub user: User,
}
