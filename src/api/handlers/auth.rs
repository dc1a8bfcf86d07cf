use axum::{extract::State, Json};

use crate::api::error::AppResult;
use crate::api::extract::ValidJson;
use crate::auth;
use crate::db::Database;
use crate::models::{LoginInput, LoginResponse};

pub async fn login(
    State(db): State<Database>,
    ValidJson(input): ValidJson<LoginInput>,
) -> AppResult<Json<LoginResponse>> {
    let user = db.authenticate(&input.email, &input.password)?;
    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(LoginResponse {
        token: auth::issue_token(&user),
        user,
    }))
}
