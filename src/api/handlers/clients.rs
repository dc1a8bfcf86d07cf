use axum::{extract::State, http::StatusCode, Json};

use super::MessageResponse;
use crate::api::error::AppResult;
use crate::api::extract::{AppPath, ValidJson};
use crate::db::Database;
use crate::models::*;

const CLIENT_LOAD: LoadSet = LoadSet::NONE.with(Relation::Users).with(Relation::Projects);

pub async fn list_clients(State(db): State<Database>) -> AppResult<Json<Vec<ClientDetail>>> {
    Ok(Json(db.list_clients(CLIENT_LOAD)?))
}

pub async fn get_client(
    State(db): State<Database>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ClientDetail>> {
    Ok(Json(db.get_client_detail(id, CLIENT_LOAD)?))
}

pub async fn create_client(
    State(db): State<Database>,
    ValidJson(input): ValidJson<CreateClientInput>,
) -> AppResult<(StatusCode, Json<ClientDetail>)> {
    let client = db.create_client(input)?;
    Ok((StatusCode::CREATED, Json(client.into())))
}

pub async fn update_client(
    State(db): State<Database>,
    AppPath(id): AppPath<i64>,
    ValidJson(input): ValidJson<UpdateClientInput>,
) -> AppResult<Json<ClientDetail>> {
    let client = db.update_client(id, input)?;
    Ok(Json(client.into()))
}

pub async fn delete_client(
    State(db): State<Database>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<MessageResponse>> {
    db.delete_client(id)?;
    Ok(MessageResponse::new("Client deleted successfully"))
}

pub async fn list_client_users(
    State(db): State<Database>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(db.list_client_users(id)?))
}

pub async fn list_client_projects(
    State(db): State<Database>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Vec<Project>>> {
    Ok(Json(db.list_client_projects(id)?))
}
