use axum::{extract::State, http::StatusCode, Json};

use super::MessageResponse;
use crate::api::error::AppResult;
use crate::api::extract::{AppPath, AppQuery, ValidJson};
use crate::db::Database;
use crate::models::*;

pub async fn list_issues(
    State(db): State<Database>,
    AppQuery(filter): AppQuery<IssueFilter>,
) -> AppResult<Json<Vec<Issue>>> {
    Ok(Json(db.list_issues(&filter)?))
}

pub async fn list_audit_task_issues(
    State(db): State<Database>,
    AppPath(audit_task_id): AppPath<i64>,
) -> AppResult<Json<Vec<Issue>>> {
    Ok(Json(db.list_audit_task_issues(audit_task_id)?))
}

pub async fn list_project_issues(
    State(db): State<Database>,
    AppPath(project_id): AppPath<i64>,
) -> AppResult<Json<Vec<Issue>>> {
    Ok(Json(db.list_project_issues(project_id)?))
}

pub async fn get_issue(
    State(db): State<Database>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Issue>> {
    Ok(Json(db.get_issue(id)?))
}

pub async fn create_issue(
    State(db): State<Database>,
    AppPath(audit_task_id): AppPath<i64>,
    ValidJson(input): ValidJson<CreateIssueInput>,
) -> AppResult<(StatusCode, Json<Issue>)> {
    let issue = db.create_issue(audit_task_id, input)?;
    Ok((StatusCode::CREATED, Json(issue)))
}

pub async fn update_issue(
    State(db): State<Database>,
    AppPath(id): AppPath<i64>,
    ValidJson(input): ValidJson<UpdateIssueInput>,
) -> AppResult<Json<Issue>> {
    Ok(Json(db.update_issue(id, input)?))
}

pub async fn delete_issue(
    State(db): State<Database>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<MessageResponse>> {
    db.delete_issue(id)?;
    Ok(MessageResponse::new("Issue deleted successfully"))
}
