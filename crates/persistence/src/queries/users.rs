// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use kermesse_domain::User;
use tracing::debug;

use crate::data_models::{UserCredentials, UserRow};
use crate::diesel_schema::users;
use crate::error::PersistenceError;

/// Retrieves a user by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user is not found.
pub fn get_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<User>, PersistenceError> {
    debug!(user_id, "Looking up user");

    users::table
        .find(user_id)
        .select(UserRow::as_select())
        .first(conn)
        .optional()?
        .map(UserRow::into_user)
        .transpose()
}

/// Retrieves a user and their password hash by email.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no user has this email.
pub fn get_credentials_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<UserCredentials>, PersistenceError> {
    debug!(email, "Looking up credentials");

    users::table
        .filter(users::email.eq(email))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?
        .map(UserRow::into_credentials)
        .transpose()
}

/// Retrieves a user and their password hash by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_credentials(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<UserCredentials>, PersistenceError> {
    users::table
        .find(user_id)
        .select(UserRow::as_select())
        .first(conn)
        .optional()?
        .map(UserRow::into_credentials)
        .transpose()
}

/// Returns true if a user already uses this email.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn email_exists(conn: &mut SqliteConnection, email: &str) -> Result<bool, PersistenceError> {
    Ok(
        diesel::select(diesel::dsl::exists(users::table.filter(users::email.eq(email))))
            .get_result(conn)?,
    )
}

/// Lists the students whose parent is `parent_id`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_children(
    conn: &mut SqliteConnection,
    parent_id: i64,
) -> Result<Vec<User>, PersistenceError> {
    users::table
        .filter(users::parent_id.eq(Some(parent_id)))
        .order(users::user_id.asc())
        .select(UserRow::as_select())
        .load(conn)?
        .into_iter()
        .map(UserRow::into_user)
        .collect()
}

/// Sums every user balance.
///
/// Used to check that purchases move money without creating or destroying it.
///
/// # Errors
///
/// Returns an error if the database query fails.
#[cfg(test)]
pub fn total_balance(conn: &mut SqliteConnection) -> Result<u64, PersistenceError> {
    let total: i64 = users::table
        .select(diesel::dsl::sql::<diesel::sql_types::BigInt>(
            "COALESCE(SUM(users.balance), 0)",
        ))
        .get_result(conn)?;
    crate::queries::statistics::to_amount("users.balance", total)
}
