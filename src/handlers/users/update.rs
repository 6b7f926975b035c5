// handlers/users/update.rs - PATCH /users/:id

use axum::extract::{rejection::JsonRejection, Path, State};
use axum::Json;

use crate::app::AppState;
use crate::database::models::user::{User, UserUpdate};
use crate::middleware::{ApiResponse, ApiResult};

/// Partial update: fields missing from the body keep their stored value.
pub async fn user_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> ApiResult<User> {
    let Json(input) = payload?;
    let user = state.users.update(&id, input).await?;
    Ok(ApiResponse::success(user))
}
