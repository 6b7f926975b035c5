use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use thiserror::Error;

use crate::auth::password::{hash_password, verify_password, PasswordError};

/// Persisted user row, as returned through the standard projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Salted hash. Never written to a response body.
    #[serde(skip_serializing, default)]
    pub password: String,
    pub birth_date: Option<NaiveDate>,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
    Guest,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Guest => "guest",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "guest" => Ok(Role::Guest),
            other => Err(FilterError::InvalidValue {
                field: UserField::Role,
                value: other.to_string(),
            }),
        }
    }
}

/// Input for `POST /users` and `/users/register`. There is no
/// `role` field: whatever a client sends for it is dropped on deserialization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, deserialize_with = "deserialize_birth_date")]
    pub birth_date: Option<NaiveDate>,
}

impl UserCreate {
    /// Build the row to insert: role forced to `user`, password hashed.
    pub fn into_new_user(self) -> Result<User, PasswordError> {
        Ok(User {
            password: hash_password(&self.password)?,
            id: self.id,
            name: self.name,
            email: self.email,
            birth_date: self.birth_date,
            role: Role::User,
        })
    }
}

/// Sparse patch for `PATCH /users/:id`. `id` and `role` are not part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "deserialize_birth_date")]
    pub birth_date: Option<NaiveDate>,
}

impl UserUpdate {
    pub fn into_patch(self) -> Result<UserPatch, PasswordError> {
        Ok(UserPatch {
            password_hash: self.password.as_deref().map(hash_password).transpose()?,
            name: self.name,
            email: self.email,
            birth_date: self.birth_date,
        })
    }
}

/// Accepts a calendar date (`1990-04-01`) or an RFC 3339 timestamp
/// (`1990-04-01T00:00:00.000Z`), which is reduced to its UTC date.
pub fn parse_birth_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

fn deserialize_birth_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|value| {
            parse_birth_date(&value)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid birthDate '{}'", value)))
        })
        .transpose()
}

/// A `UserUpdate` ready for storage: the password, if any, is already hashed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.birth_date.is_none()
    }

    /// Overwrite present fields, leave absent ones untouched.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(hash) = &self.password_hash {
            user.password = hash.clone();
        }
        if let Some(birth_date) = self.birth_date {
            user.birth_date = Some(birth_date);
        }
    }
}

/// Narrow projection used by login: no birth date, but the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct UserCredentials {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub password: String,
}

impl UserCredentials {
    pub fn verify_password(&self, candidate: &str) -> Result<bool, PasswordError> {
        verify_password(candidate, &self.password)
    }
}

impl From<&User> for UserCredentials {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            password: user.password.clone(),
        }
    }
}

/// Columns of the `users` table that may appear in a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    Id,
    Name,
    Email,
    Password,
    BirthDate,
    Role,
}

impl UserField {
    /// Standard projection. New columns are never returned unless listed here.
    pub const PROJECTION: [UserField; 6] = [
        UserField::Id,
        UserField::Name,
        UserField::Email,
        UserField::Password,
        UserField::BirthDate,
        UserField::Role,
    ];

    /// Projection for `search_for_login`.
    pub const CREDENTIALS: [UserField; 5] = [
        UserField::Id,
        UserField::Name,
        UserField::Email,
        UserField::Role,
        UserField::Password,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            UserField::Id => "id",
            UserField::Name => "name",
            UserField::Email => "email",
            UserField::Password => "password",
            UserField::BirthDate => "birth_date",
            UserField::Role => "role",
        }
    }

    /// Name used on the wire (JSON keys, query parameters).
    pub fn api_name(&self) -> &'static str {
        match self {
            UserField::BirthDate => "birthDate",
            other => other.column(),
        }
    }
}

impl fmt::Display for UserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Unknown or non-searchable field '{0}'")]
    UnknownField(String),

    #[error("Invalid value '{value}' for field '{field}'")]
    InvalidValue { field: UserField, value: String },
}

/// Single field/value lookup over the searchable user fields. Password is not one of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    Id(String),
    Name(String),
    Email(String),
    BirthDate(Option<NaiveDate>),
    Role(Role),
}

impl UserFilter {
    pub fn field(&self) -> UserField {
        match self {
            UserFilter::Id(_) => UserField::Id,
            UserFilter::Name(_) => UserField::Name,
            UserFilter::Email(_) => UserField::Email,
            UserFilter::BirthDate(_) => UserField::BirthDate,
            UserFilter::Role(_) => UserField::Role,
        }
    }

    /// Parse an untrusted `field=value` pair. Unknown fields are rejected here,
    /// before anything reaches storage.
    pub fn parse(field: &str, value: &str) -> Result<Self, FilterError> {
        match field {
            "id" => Ok(UserFilter::Id(value.to_string())),
            "name" => Ok(UserFilter::Name(value.to_string())),
            "email" => Ok(UserFilter::Email(value.to_string())),
            "birthDate" | "birth_date" => {
                if value.is_empty() || value == "null" {
                    return Ok(UserFilter::BirthDate(None));
                }
                parse_birth_date(value)
                    .map(|date| UserFilter::BirthDate(Some(date)))
                    .ok_or_else(|| FilterError::InvalidValue {
                        field: UserField::BirthDate,
                        value: value.to_string(),
                    })
            }
            "role" => value.parse().map(UserFilter::Role),
            other => Err(FilterError::UnknownField(other.to_string())),
        }
    }

    pub fn matches(&self, user: &User) -> bool {
        match self {
            UserFilter::Id(id) => &user.id == id,
            UserFilter::Name(name) => &user.name == name,
            UserFilter::Email(email) => &user.email == email,
            UserFilter::BirthDate(date) => &user.birth_date == date,
            UserFilter::Role(role) => &user.role == role,
        }
    }
}

/// Lookup keys accepted by `search_for_login`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginKey {
    Email,
    Name,
}

impl LoginKey {
    pub fn field(&self) -> UserField {
        match self {
            LoginKey::Email => UserField::Email,
            LoginKey::Name => UserField::Name,
        }
    }

    pub fn filter(&self, value: &str) -> UserFilter {
        match self {
            LoginKey::Email => UserFilter::Email(value.to_string()),
            LoginKey::Name => UserFilter::Name(value.to_string()),
        }
    }
}

impl fmt::Display for LoginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field().api_name())
    }
}
