pub mod user;

pub use user::{
    FilterError, LoginKey, Role, User, UserCreate, UserCredentials, UserField, UserFilter, UserPatch, UserUpdate,
};
