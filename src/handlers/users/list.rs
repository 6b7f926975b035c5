// handlers/users/list.rs - GET /users

use std::collections::HashMap;

use axum::extract::{rejection::QueryRejection, Query, State};

use crate::app::AppState;
use crate::database::models::user::{User, UserFilter};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// List users.
///
/// With a single `?field=value` query parameter the list is narrowed with
/// `find_by_field`; the field must be one of `id`, `name`, `email`,
/// `birthDate` or `role`. Without parameters every user is returned.
pub async fn users_list(
    State(state): State<AppState>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> ApiResult<Vec<User>> {
    let Query(params) = query?;
    let users = match single_filter(&params)? {
        Some(filter) => state.users.find_by_field(&filter).await?,
        None => state.users.read_all().await?,
    };
    Ok(ApiResponse::success(users))
}

fn single_filter(params: &HashMap<String, String>) -> Result<Option<UserFilter>, ApiError> {
    let mut pairs = params.iter();
    match (pairs.next(), pairs.next()) {
        (None, _) => Ok(None),
        (Some((field, value)), None) => Ok(Some(UserFilter::parse(field, value)?)),
        _ => Err(ApiError::bad_request("Only one field=value filter is supported")),
    }
}
