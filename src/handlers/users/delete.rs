// handlers/users/delete.rs - DELETE /users/:id
//
// Mounted behind `require_auth`, which guarantees the `AuthUser` extension.

use axum::extract::{Path, State};
use axum::Extension;

use crate::app::AppState;
use crate::database::models::user::User;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// Delete a user and return the record as it was.
pub async fn user_delete(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<User> {
    let user = state.users.delete(&id).await?;
    tracing::info!("User {} deleted by {}", user.id, caller.id);
    Ok(ApiResponse::success(user))
}
