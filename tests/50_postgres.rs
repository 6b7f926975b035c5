//! Runs the SQL repository against a real database. Skipped unless DATABASE_URL is set.

use anyhow::Result;
use sqlx::Executor;

use user_service::config::AppConfig;
use user_service::database::models::user::{LoginKey, Role, UserCreate, UserFilter, UserUpdate};
use user_service::database::{DatabaseManager, UserRepository, UserSqlRepository};

async fn repository() -> Result<Option<UserSqlRepository>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping postgres test");
        return Ok(None);
    };

    let mut database = AppConfig::development().database;
    database.url = Some(url);
    database.max_connections = 2;

    let pool = DatabaseManager::connect(&database).await?;
    pool.execute(include_str!("../sql/users.sql")).await?;
    Ok(Some(UserSqlRepository::new(pool)))
}

fn new_user(tag: &str) -> UserCreate {
    UserCreate {
        id: format!("pg-{}", tag),
        name: format!("Name {}", tag),
        email: format!("{}@example.test", tag),
        password: "secret".to_string(),
        birth_date: None,
    }
}

#[tokio::test]
async fn sql_repository_crud_cycle() -> Result<()> {
    let Some(repo) = repository().await? else {
        return Ok(());
    };
    repo.ping().await?;

    let tag = uuid::Uuid::new_v4().simple().to_string();
    let created = repo.create(new_user(&tag)).await?;
    assert_eq!(created.role, Role::User);
    assert!(created.password.starts_with("$2b$"));

    let found = repo.find_by_field(&UserFilter::Email(created.email.clone())).await?;
    assert_eq!(found, vec![created.clone()]);

    let credentials = repo.search_for_login(LoginKey::Email, &created.email).await?;
    assert!(credentials.verify_password("secret")?);

    let patch = UserUpdate {
        name: Some("Renamed".to_string()),
        ..UserUpdate::default()
    };
    let updated = repo.update(&created.id, patch).await?;
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.email, created.email);

    // Duplicate email is a storage failure, not absence
    let mut clash = new_user(&format!("{}-2", tag));
    clash.email = created.email.clone();
    let err = repo.create(clash).await.unwrap_err();
    assert!(!err.is_not_found());

    let deleted = repo.delete(&created.id).await?;
    assert_eq!(deleted.id, created.id);
    assert!(repo.read_by_id(&created.id).await.unwrap_err().is_not_found());
    assert!(repo.delete(&created.id).await.unwrap_err().is_not_found());
    assert!(repo
        .update(&created.id, UserUpdate::default())
        .await
        .unwrap_err()
        .is_not_found());
    assert!(repo.find_by_field(&UserFilter::Id(created.id.clone())).await?.is_empty());

    Ok(())
}
