pub mod error;
pub mod extract;
mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::db::Database;

pub use error::{AppError, AppResult, ErrorResponse};
pub use handlers::{MessageResponse, MAX_CSV_UPLOAD_BYTES};

/// Router with every origin allowed, as used by tests and local runs.
pub fn create_router(db: Database) -> Router {
    build_router(db, CorsLayer::permissive())
}

/// Router honouring the configured CORS origins.
pub fn create_router_with_config(db: Database, config: &ServerConfig) -> Router {
    build_router(db, cors_layer(config.cors_origins.as_deref()))
}

fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let Some(origins) = origins else {
        return CorsLayer::permissive();
    };
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

fn build_router(db: Database, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        // Projects
        .route(
            "/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/projects/{id}",
            get(handlers::get_project)
                .put(handlers::update_project)
                .delete(handlers::delete_project),
        )
        .route("/projects/{id}/archive", post(handlers::archive_project))
        .route(
            "/projects/{id}/requirements",
            get(handlers::list_project_requirements).post(handlers::create_requirement),
        )
        .route("/projects/{id}/users", get(handlers::list_project_users))
        .route(
            "/projects/{id}/users/{user_id}",
            post(handlers::assign_user).delete(handlers::unassign_user),
        )
        .route("/projects/{id}/issues", get(handlers::list_project_issues))
        // Users
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route("/users/{id}/projects", get(handlers::list_user_projects))
        // Clients
        .route(
            "/clients",
            get(handlers::list_clients).post(handlers::create_client),
        )
        .route(
            "/clients/{id}",
            get(handlers::get_client)
                .put(handlers::update_client)
                .delete(handlers::delete_client),
        )
        .route("/clients/{id}/users", get(handlers::list_client_users))
        .route("/clients/{id}/projects", get(handlers::list_client_projects))
        // Requirements
        .route("/requirements", get(handlers::list_requirements))
        .route(
            "/requirements/{id}",
            get(handlers::get_requirement)
                .put(handlers::update_requirement)
                .delete(handlers::delete_requirement),
        )
        .route(
            "/requirements/{id}/audit-tasks",
            get(handlers::list_requirement_audit_tasks).post(handlers::create_audit_task),
        )
        // Audit tasks
        .route("/audit-tasks", get(handlers::list_audit_tasks))
        .route(
            "/audit-tasks/{id}",
            get(handlers::get_audit_task)
                .put(handlers::update_audit_task)
                .delete(handlers::delete_audit_task),
        )
        .route(
            "/audit-tasks/{id}/issues",
            get(handlers::list_audit_task_issues).post(handlers::create_issue),
        )
        // Issues
        .route("/issues", get(handlers::list_issues))
        .route(
            "/issues/{id}",
            get(handlers::get_issue)
                .put(handlers::update_issue)
                .delete(handlers::delete_issue),
        )
        // Uploads
        .route(
            "/uploads/requirements-csv/{project_id}",
            post(handlers::upload_requirements_csv)
                .layer(DefaultBodyLimit::max(handlers::MAX_CSV_UPLOAD_BYTES)),
        )
        // Auth
        .route("/auth/login", post(handlers::login));

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(db)
}
