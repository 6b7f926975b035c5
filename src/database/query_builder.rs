//! SQL text for the `users` table.
//!
//! Every statement lists its columns from [`UserField::PROJECTION`] or
//! [`UserField::CREDENTIALS`]; nothing here ever selects `*`.

use sqlx::{Postgres, QueryBuilder};

use crate::database::models::user::{LoginKey, UserField, UserFilter, UserPatch};

pub const USERS_TABLE: &str = "users";

pub fn column_list(fields: &[UserField]) -> String {
    fields
        .iter()
        .map(UserField::column)
        .collect::<Vec<_>>()
        .join(", ")
}

fn projection() -> String {
    column_list(&UserField::PROJECTION)
}

pub fn select_all_sql() -> String {
    format!("SELECT {} FROM {} ORDER BY id", projection(), USERS_TABLE)
}

pub fn select_by_id_sql() -> String {
    format!("SELECT {} FROM {} WHERE id = $1", projection(), USERS_TABLE)
}

/// `SELECT` for a single-field lookup. Binds `$1` unless the filter is
/// `BirthDate(None)`, which has to be spelled `IS NULL`.
pub fn select_where_sql(filter: &UserFilter) -> String {
    let column = filter.field().column();
    let predicate = match filter {
        UserFilter::BirthDate(None) => format!("{} IS NULL", column),
        _ => format!("{} = $1", column),
    };
    format!(
        "SELECT {} FROM {} WHERE {} ORDER BY id",
        projection(),
        USERS_TABLE,
        predicate
    )
}

pub fn login_sql(key: LoginKey) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = $1 ORDER BY id LIMIT 1",
        column_list(&UserField::CREDENTIALS),
        USERS_TABLE,
        key.field().column()
    )
}

pub fn insert_sql() -> String {
    let placeholders = (1..=UserField::PROJECTION.len())
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        USERS_TABLE,
        projection(),
        placeholders,
        projection()
    )
}

pub fn delete_sql() -> String {
    format!("DELETE FROM {} WHERE id = $1 RETURNING {}", USERS_TABLE, projection())
}

/// `UPDATE ... SET` over the present patch fields only.
///
/// Returns `None` for an empty patch, which has nothing to write.
pub fn update_query(id: &str, patch: &UserPatch) -> Option<QueryBuilder<'static, Postgres>> {
    if patch.is_empty() {
        return None;
    }

    let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", USERS_TABLE));
    {
        let mut set = qb.separated(", ");
        if let Some(name) = &patch.name {
            set.push("name = ").push_bind_unseparated(name.clone());
        }
        if let Some(email) = &patch.email {
            set.push("email = ").push_bind_unseparated(email.clone());
        }
        if let Some(hash) = &patch.password_hash {
            set.push("password = ").push_bind_unseparated(hash.clone());
        }
        if let Some(birth_date) = patch.birth_date {
            set.push("birth_date = ").push_bind_unseparated(birth_date);
        }
    }
    qb.push(" WHERE id = ")
        .push_bind(id.to_string())
        .push(" RETURNING ")
        .push(projection());

    Some(qb)
}
