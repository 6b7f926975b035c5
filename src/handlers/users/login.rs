// handlers/users/login.rs - POST /users/login

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::database::models::user::{LoginKey, UserCredentials};
use crate::database::repository::RepositoryError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// Login body. The account is looked up by `email` when present, else by `name`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub password: String,
}

impl LoginRequest {
    fn lookup(&self) -> Result<(LoginKey, &str), RepositoryError> {
        match (&self.email, &self.name) {
            (Some(email), _) => Ok((LoginKey::Email, email.as_str())),
            (None, Some(name)) => Ok((LoginKey::Name, name.as_str())),
            (None, None) => Err(RepositoryError::invalid_login_key()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: UserCredentials,
}

/// Check credentials and hand out a bearer token.
///
/// Unknown account → 404 `Invalid <key> or password`; wrong password → 401.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;
    let (key, value) = request.lookup()?;

    let user = state.users.search_for_login(key, value).await?;
    if !user.verify_password(&request.password)? {
        tracing::warn!("Failed login for {} {}", key, value);
        return Err(ApiError::unauthorized(format!("Invalid {} or password", key)));
    }

    let token = state.jwt.issue(&user)?;
    tracing::info!("User {} logged in", user.id);

    Ok(ApiResponse::success(LoginResponse {
        token,
        expires_in: state.jwt.expires_in_secs(),
        user,
    }))
}
