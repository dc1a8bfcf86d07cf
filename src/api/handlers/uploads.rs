use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::{extract::State, http::StatusCode, Json};

use crate::api::error::{AppError, AppResult};
use crate::api::extract::AppPath;
use crate::db::Database;
use crate::import;
use crate::models::RequirementImport;

const FILE_FIELD: &str = "file";

/// Largest accepted upload body.
pub const MAX_CSV_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

fn no_file(message: Option<String>) -> AppError {
    AppError::BadRequest {
        error: "No file uploaded",
        message,
    }
}

fn upload_error(status: StatusCode, message: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { message }
    } else {
        no_file(Some(message))
    }
}

/// Create requirements from an uploaded CSV under a project.
///
/// The project is checked before the body is touched, so a missing project is
/// a 404 whatever was uploaded.
pub async fn upload_requirements_csv(
    State(db): State<Database>,
    AppPath(project_id): AppPath<i64>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<(StatusCode, Json<RequirementImport>)> {
    db.get_project(project_id)?;

    let mut multipart = multipart.map_err(|e| upload_error(e.status(), e.body_text()))?;
    let mut contents = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error(e.status(), e.body_text()))?
    {
        if field.name() == Some(FILE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| upload_error(e.status(), e.body_text()))?;
            contents = Some(bytes);
            break;
        }
    }
    let contents = contents.ok_or_else(|| no_file(None))?;

    tracing::debug!(project_id, bytes = contents.len(), "Received requirements CSV");
    let requirements = import::import_requirements(&db, project_id, &contents[..])?;
    Ok((StatusCode::CREATED, Json(requirements.into())))
}
