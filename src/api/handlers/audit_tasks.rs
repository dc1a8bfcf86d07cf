use axum::{extract::State, http::StatusCode, Json};

use super::MessageResponse;
use crate::api::error::AppResult;
use crate::api::extract::{AppPath, AppQuery, ValidJson};
use crate::db::Database;
use crate::models::*;

const AUDIT_TASK_LOAD: LoadSet = LoadSet::NONE.with(Relation::Issue);

pub async fn list_audit_tasks(
    State(db): State<Database>,
    AppQuery(filter): AppQuery<AuditTaskFilter>,
) -> AppResult<Json<Vec<AuditTaskDetail>>> {
    Ok(Json(db.list_audit_tasks(&filter, AUDIT_TASK_LOAD)?))
}

pub async fn list_requirement_audit_tasks(
    State(db): State<Database>,
    AppPath(requirement_id): AppPath<i64>,
) -> AppResult<Json<Vec<AuditTaskDetail>>> {
    Ok(Json(
        db.list_requirement_audit_tasks(requirement_id, AUDIT_TASK_LOAD)?,
    ))
}

pub async fn get_audit_task(
    State(db): State<Database>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<AuditTaskDetail>> {
    Ok(Json(db.get_audit_task_detail(id, AUDIT_TASK_LOAD)?))
}

pub async fn create_audit_task(
    State(db): State<Database>,
    AppPath(requirement_id): AppPath<i64>,
    ValidJson(input): ValidJson<CreateAuditTaskInput>,
) -> AppResult<(StatusCode, Json<AuditTaskDetail>)> {
    let task = db.create_audit_task(requirement_id, input)?;
    Ok((StatusCode::CREATED, Json(task.into())))
}

pub async fn update_audit_task(
    State(db): State<Database>,
    AppPath(id): AppPath<i64>,
    ValidJson(input): ValidJson<UpdateAuditTaskInput>,
) -> AppResult<Json<AuditTaskDetail>> {
    let audit_task = db.update_audit_task(id, input)?;
    Ok(Json(audit_task.into()))
}

pub async fn delete_audit_task(
    State(db): State<Database>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<MessageResponse>> {
    db.delete_audit_task(id)?;
    Ok(MessageResponse::new("Audit task deleted successfully"))
}
