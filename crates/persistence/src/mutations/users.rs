// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::info;

use crate::data_models::NewUser;
use crate::diesel_schema::users;
use crate::error::PersistenceError;

/// Creates a user with a zero balance.
///
/// The password must already be hashed.
///
/// # Errors
///
/// Returns `PersistenceError::Duplicate` if the email is taken.
pub fn create_user(
    conn: &mut SqliteConnection,
    new_user: &NewUser<'_>,
) -> Result<i64, PersistenceError> {
    let user_id: i64 = diesel::insert_into(users::table)
        .values((
            users::parent_id.eq(new_user.parent_id),
            users::name.eq(new_user.name),
            users::email.eq(new_user.email),
            users::password_hash.eq(new_user.password_hash),
            users::role.eq(new_user.role.as_str()),
        ))
        .returning(users::user_id)
        .get_result(conn)?;

    info!(user_id, role = new_user.role.as_str(), "User created");
    Ok(user_id)
}

/// Replaces a user's password hash.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the user does not exist.
pub fn update_password_hash(
    conn: &mut SqliteConnection,
    user_id: i64,
    password_hash: &str,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(users::table.find(user_id))
        .set(users::password_hash.eq(password_hash))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("user {user_id}")));
    }

    info!(user_id, "Password updated");
    Ok(())
}
