use axum::{extract::State, http::StatusCode, Json};

use super::MessageResponse;
use crate::api::error::AppResult;
use crate::api::extract::{AppPath, AppQuery, ValidJson};
use crate::db::Database;
use crate::models::*;

pub async fn list_users(
    State(db): State<Database>,
    AppQuery(filter): AppQuery<UserFilter>,
) -> AppResult<Json<Vec<UserDetail>>> {
    Ok(Json(db.list_users(&filter, LoadSet::of(&[Relation::Client]))?))
}

pub async fn get_user(
    State(db): State<Database>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<UserDetail>> {
    let load = LoadSet::of(&[Relation::Client, Relation::Projects]);
    Ok(Json(db.get_user_detail(id, load)?))
}

pub async fn create_user(
    State(db): State<Database>,
    ValidJson(input): ValidJson<CreateUserInput>,
) -> AppResult<(StatusCode, Json<UserDetail>)> {
    let user = db.create_user(input)?;
    tracing::info!(user_id = user.id, role = user.role.as_str(), "User created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn update_user(
    State(db): State<Database>,
    AppPath(id): AppPath<i64>,
    ValidJson(input): ValidJson<UpdateUserInput>,
) -> AppResult<Json<UserDetail>> {
    let user = db.update_user(id, input)?;
    Ok(Json(user.into()))
}

pub async fn delete_user(
    State(db): State<Database>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<MessageResponse>> {
    db.delete_user(id)?;
    Ok(MessageResponse::new("User deleted successfully"))
}

pub async fn list_user_projects(
    State(db): State<Database>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Vec<Project>>> {
    Ok(Json(db.list_user_projects(id)?))
}
