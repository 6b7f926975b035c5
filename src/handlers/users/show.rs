// handlers/users/show.rs - GET /users/:id

use axum::extract::{Path, State};

use crate::app::AppState;
use crate::database::models::user::User;
use crate::middleware::{ApiResponse, ApiResult};

pub async fn user_show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    let user = state.users.read_by_id(&id).await?;
    Ok(ApiResponse::success(user))
}
