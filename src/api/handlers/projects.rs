use axum::{extract::State, http::StatusCode, Json};

use super::MessageResponse;
use crate::api::error::AppResult;
use crate::api::extract::{AppPath, AppQuery, ValidJson};
use crate::db::Database;
use crate::models::*;

const PROJECT_LOAD: LoadSet = LoadSet::NONE
    .with(Relation::Client)
    .with(Relation::Users)
    .with(Relation::Requirements);

pub async fn list_projects(
    State(db): State<Database>,
    AppQuery(filter): AppQuery<ProjectFilter>,
) -> AppResult<Json<Vec<ProjectDetail>>> {
    Ok(Json(db.list_projects(&filter, LoadSet::NONE)?))
}

pub async fn get_project(
    State(db): State<Database>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ProjectDetail>> {
    Ok(Json(db.get_project_detail(id, PROJECT_LOAD)?))
}

pub async fn create_project(
    State(db): State<Database>,
    ValidJson(input): ValidJson<CreateProjectInput>,
) -> AppResult<(StatusCode, Json<ProjectDetail>)> {
    let project = db.create_project(input)?;
    tracing::info!(project_id = project.id, status = %project.status, "Project created");
    Ok((StatusCode::CREATED, Json(project.into())))
}

pub async fn update_project(
    State(db): State<Database>,
    AppPath(id): AppPath<i64>,
    ValidJson(input): ValidJson<UpdateProjectInput>,
) -> AppResult<Json<ProjectDetail>> {
    let project = db.update_project(id, input)?;
    Ok(Json(project.into()))
}

pub async fn delete_project(
    State(db): State<Database>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<MessageResponse>> {
    db.delete_project(id)?;
    Ok(MessageResponse::new("Project deleted successfully"))
}

pub async fn archive_project(
    State(db): State<Database>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ProjectDetail>> {
    let project = db.archive_project(id)?;
    Ok(Json(project.into()))
}

// ============================================================
// Project <-> User assignment
// ============================================================

pub async fn list_project_users(
    State(db): State<Database>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Vec<UserDetail>>> {
    let load = LoadSet::NONE.with(Relation::UsersClient);
    Ok(Json(db.list_project_users(id, load)?))
}

pub async fn assign_user(
    State(db): State<Database>,
    AppPath((project_id, user_id)): AppPath<(i64, i64)>,
) -> AppResult<Json<MessageResponse>> {
    db.assign_user(project_id, user_id)?;
    Ok(MessageResponse::new("User assigned to project successfully"))
}

pub async fn unassign_user(
    State(db): State<Database>,
    AppPath((project_id, user_id)): AppPath<(i64, i64)>,
) -> AppResult<Json<MessageResponse>> {
    db.unassign_user(project_id, user_id)?;
    Ok(MessageResponse::new("User removed from project successfully"))
}
