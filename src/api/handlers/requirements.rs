use axum::{extract::State, http::StatusCode, Json};

use super::MessageResponse;
use crate::api::error::AppResult;
use crate::api::extract::{AppPath, AppQuery, ValidJson};
use crate::db::Database;
use crate::models::*;

const REQUIREMENT_LOAD: LoadSet = LoadSet::NONE.with(Relation::AuditTasks);

pub async fn list_requirements(
    State(db): State<Database>,
    AppQuery(filter): AppQuery<RequirementFilter>,
) -> AppResult<Json<Vec<RequirementDetail>>> {
    Ok(Json(db.list_requirements(&filter, REQUIREMENT_LOAD)?))
}

pub async fn list_project_requirements(
    State(db): State<Database>,
    AppPath(project_id): AppPath<i64>,
) -> AppResult<Json<Vec<RequirementDetail>>> {
    Ok(Json(
        db.list_project_requirements(project_id, REQUIREMENT_LOAD)?,
    ))
}

pub async fn get_requirement(
    State(db): State<Database>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<RequirementDetail>> {
    Ok(Json(db.get_requirement_detail(id, REQUIREMENT_LOAD)?))
}

pub async fn create_requirement(
    State(db): State<Database>,
    AppPath(project_id): AppPath<i64>,
    ValidJson(input): ValidJson<CreateRequirementInput>,
) -> AppResult<(StatusCode, Json<RequirementDetail>)> {
    let requirement = db.create_requirement(project_id, input)?;
    Ok((StatusCode::CREATED, Json(requirement.into())))
}

pub async fn update_requirement(
    State(db): State<Database>,
    AppPath(id): AppPath<i64>,
    ValidJson(input): ValidJson<UpdateRequirementInput>,
) -> AppResult<Json<RequirementDetail>> {
    let requirement = db.update_requirement(id, input)?;
    Ok(Json(requirement.into()))
}

pub async fn delete_requirement(
    State(db): State<Database>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<MessageResponse>> {
    db.delete_requirement(id)?;
    Ok(MessageResponse::new("Requirement deleted successfully"))
}
