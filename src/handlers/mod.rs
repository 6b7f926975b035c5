// handlers/mod.rs - HTTP handlers
//
// Two groups:
// users  → the /users resource (login, register, CRUD)
// system → service info and health
//
pub mod system;
pub mod users;

pub use system::{health, root};
