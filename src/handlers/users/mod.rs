// handlers/users/mod.rs - User resource handlers
//
// Each handler extracts its parameters, makes exactly one repository call and
// maps the result. Errors travel back as `ApiError` and are rendered there.
//
// Only deletion sits behind the authentication gate (see `app::user_routes`).

pub mod create; // POST /users, /users/register
pub mod delete; // DELETE /users/:id (authenticated)
pub mod list;   // GET /users
pub mod login;  // POST /users/login
pub mod show;   // GET /users/:id
pub mod update; // PATCH /users/:id

pub use create::user_create;
pub use delete::user_delete;
pub use list::users_list;
pub use login::login;
pub use show::user_show;
pub use update::user_update;
