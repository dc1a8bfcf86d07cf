mod audit_tasks;
mod auth;
mod clients;
mod issues;
mod projects;
mod requirements;
mod uploads;
mod users;

pub use audit_tasks::*;
pub use auth::*;
pub use clients::*;
pub use issues::*;
pub use projects::*;
pub use requirements::*;
pub use uploads::*;
pub use users::*;

use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Body returned by deletes and relationship changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

// ============================================================
// Health & index
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn index() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Audit Tracker API v1",
        "endpoints": {
            "projects": "/api/v1/projects",
            "users": "/api/v1/users",
            "clients": "/api/v1/clients",
            "requirements": "/api/v1/requirements",
            "audit-tasks": "/api/v1/audit-tasks",
            "issues": "/api/v1/issues",
            "uploads": "/api/v1/uploads",
            "auth": "/api/v1/auth",
            "health": "/api/v1/health",
        }
    }))
}
