// handlers/users/create.rs - POST /users and POST /users/register

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;

use crate::app::AppState;
use crate::database::models::user::{User, UserCreate};
use crate::middleware::{ApiResponse, ApiResult};

/// Create a user. Any `role` in the payload is ignored; new users are always `user`.
pub async fn user_create(
    State(state): State<AppState>,
    payload: Result<Json<UserCreate>, JsonRejection>,
) -> ApiResult<User> {
    let Json(input) = payload?;
    let user = state.users.create(input).await?;
    tracing::info!("Created user {}", user.id);
    Ok(ApiResponse::created(user))
}
