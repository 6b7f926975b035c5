use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    handler::Handler,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::JwtAuthority;
use crate::config::{AppConfig, DatabaseConfig, SecurityConfig};
use crate::database::{DatabaseError, DatabaseManager, MemoryUserRepository, UserRepository, UserSqlRepository};
use crate::error::{method_not_allowed, panic_response, route_not_found};
use crate::handlers::{self, users};
use crate::middleware::require_auth;

/// Shared per-request state: the user store and the token authority.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub jwt: Arc<JwtAuthority>,
}

impl AppState {
    pub fn new(users: Arc<dyn UserRepository>, jwt: JwtAuthority) -> Self {
        Self {
            users,
            jwt: Arc::new(jwt),
        }
    }
}

/// Postgres-backed repository when a database URL is configured, the
/// in-memory store otherwise.
pub async fn build_repository(database: &DatabaseConfig) -> Result<Arc<dyn UserRepository>, DatabaseError> {
    match database.url {
        Some(_) => {
            let pool = DatabaseManager::connect(database).await?;
            Ok(Arc::new(UserSqlRepository::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, users are kept in memory only");
            Ok(Arc::new(MemoryUserRepository::new()))
        }
    }
}

/// Full application router with the global layers applied.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .route("/", get(handlers::root).fallback(method_not_allowed))
        .route("/health", get(handlers::health).fallback(method_not_allowed))
        .merge(user_routes(state.clone()))
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer(&config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn user_routes(state: AppState) -> Router<AppState> {
    // Deletion is the only guarded operation.
    let guarded_delete = users::user_delete.layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        // Static segments take priority over `:id`
        .route("/users/login", post(users::login).fallback(method_not_allowed))
        .route("/users/register", post(users::user_create).fallback(method_not_allowed))
        .route(
            "/users",
            get(users::users_list)
                .post(users::user_create)
                .fallback(method_not_allowed),
        )
        .route(
            "/users/",
            get(users::users_list)
                .post(users::user_create)
                .fallback(method_not_allowed),
        )
        .route(
            "/users/:id",
            get(users::user_show)
                .patch(users::user_update)
                .delete(guarded_delete)
                .fallback(method_not_allowed),
        )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let methods = [Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS];
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new().allow_origin(Any).allow_methods(methods).allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new().allow_origin(origins).allow_methods(methods).allow_headers(Any)
}
