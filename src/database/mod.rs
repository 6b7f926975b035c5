pub mod manager;
pub mod memory;
pub mod models;
pub mod query_builder;
pub mod repository;
pub mod sql_repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryUserRepository;
pub use repository::{RepositoryError, UserRepository};
pub use sql_repository::UserSqlRepository;
