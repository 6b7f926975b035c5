use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::database::models::user::{LoginKey, User, UserCreate, UserCredentials, UserFilter, UserUpdate};
use crate::database::query_builder;
use crate::database::repository::{login_not_found, RepositoryError, UserRepository};

/// Unique and check violations become `Constraint`; the rest stays a database error.
fn write_error(err: sqlx::Error) -> RepositoryError {
    let constraint = err
        .as_database_error()
        .and_then(|db| db.constraint())
        .map(str::to_string);
    match constraint {
        Some(constraint) => RepositoryError::Constraint(constraint),
        None => RepositoryError::Database(err),
    }
}

/// [`UserRepository`] over the Postgres `users` table.
#[derive(Clone)]
pub struct UserSqlRepository {
    pool: PgPool,
}

impl UserSqlRepository {
    pub fn new(pool: PgPool) -> Self {
        debug!("Instantiated user repository (postgres)");
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for UserSqlRepository {
    async fn find_by_field(&self, filter: &UserFilter) -> Result<Vec<User>, RepositoryError> {
        debug!("find_by_field {}", filter.field());
        let sql = query_builder::select_where_sql(filter);
        let query = sqlx::query_as::<_, User>(&sql);
        let query = match filter {
            UserFilter::Id(v) | UserFilter::Name(v) | UserFilter::Email(v) => query.bind(v.as_str()),
            UserFilter::BirthDate(Some(date)) => query.bind(*date),
            UserFilter::BirthDate(None) => query,
            UserFilter::Role(role) => query.bind(*role),
        };
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn search_for_login(&self, key: LoginKey, value: &str) -> Result<UserCredentials, RepositoryError> {
        let sql = query_builder::login_sql(key);
        sqlx::query_as::<_, UserCredentials>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| login_not_found(key))
    }

    async fn read_all(&self) -> Result<Vec<User>, RepositoryError> {
        let sql = query_builder::select_all_sql();
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
    }

    async fn read_by_id(&self, id: &str) -> Result<User, RepositoryError> {
        let sql = query_builder::select_by_id_sql();
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::user_not_found(id))
    }

    async fn create(&self, input: UserCreate) -> Result<User, RepositoryError> {
        let user = input.into_new_user()?;
        debug!("create user {}", user.id);
        let sql = query_builder::insert_sql();
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(&user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(user.birth_date)
            .bind(user.role)
            .fetch_one(&self.pool)
            .await
            .map_err(write_error)?;
        Ok(created)
    }

    async fn update(&self, id: &str, input: UserUpdate) -> Result<User, RepositoryError> {
        let patch = input.into_patch()?;
        let Some(mut qb) = query_builder::update_query(id, &patch) else {
            return self.read_by_id(id).await;
        };
        debug!("update user {}", id);
        // No row updated means no row with that id: report it as absence.
        qb.build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await
            .map_err(write_error)?
            .ok_or_else(|| RepositoryError::user_not_found(id))
    }

    async fn delete(&self, id: &str) -> Result<User, RepositoryError> {
        self.read_by_id(id).await?;
        debug!("delete user {}", id);
        let sql = query_builder::delete_sql();
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::user_not_found(id))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
