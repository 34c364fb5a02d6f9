// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use kermesse_domain::LifecycleStatus;
use tracing::info;

use crate::diesel_schema::{kermesses, kermesses_stands, kermesses_users};
use crate::error::PersistenceError;

/// Creates a running kermesse owned by `organizer_id`.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_kermesse(
    conn: &mut SqliteConnection,
    organizer_id: i64,
    name: &str,
    description: &str,
) -> Result<i64, PersistenceError> {
    let kermesse_id: i64 = diesel::insert_into(kermesses::table)
        .values((
            kermesses::organizer_id.eq(organizer_id),
            kermesses::name.eq(name),
            kermesses::description.eq(description),
            kermesses::status.eq(LifecycleStatus::Started.as_str()),
        ))
        .returning(kermesses::kermesse_id)
        .get_result(conn)?;

    info!(kermesse_id, organizer_id, "Kermesse created");
    Ok(kermesse_id)
}

/// Updates the name and description of a running kermesse.
///
/// # Errors
///
/// Returns `PersistenceError::AlreadyFinished` if the kermesse is not running.
pub fn update_kermesse(
    conn: &mut SqliteConnection,
    kermesse_id: i64,
    name: &str,
    description: &str,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(
        kermesses::table
            .filter(kermesses::kermesse_id.eq(kermesse_id))
            .filter(kermesses::status.eq(LifecycleStatus::Started.as_str())),
    )
    .set((kermesses::name.eq(name), kermesses::description.eq(description)))
    .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::AlreadyFinished {
            resource: "kermesse",
            id: kermesse_id,
        });
    }

    info!(kermesse_id, "Kermesse updated");
    Ok(())
}

/// Moves a running kermesse to `FINISHED`.
///
/// # Errors
///
/// Returns `PersistenceError::AlreadyFinished` if it was not running.
pub fn finish_kermesse(
    conn: &mut SqliteConnection,
    kermesse_id: i64,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(
        kermesses::table
            .filter(kermesses::kermesse_id.eq(kermesse_id))
            .filter(kermesses::status.eq(LifecycleStatus::Started.as_str())),
    )
    .set(kermesses::status.eq(LifecycleStatus::Finished.as_str()))
    .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::AlreadyFinished {
            resource: "kermesse",
            id: kermesse_id,
        });
    }

    info!(kermesse_id, "Kermesse finished");
    Ok(())
}

/// Links a user to a kermesse.
///
/// # Errors
///
/// Returns `PersistenceError::Duplicate` if the link already exists.
pub fn link_user(
    conn: &mut SqliteConnection,
    kermesse_id: i64,
    user_id: i64,
) -> Result<(), PersistenceError> {
    diesel::insert_into(kermesses_users::table)
        .values((
            kermesses_users::kermesse_id.eq(kermesse_id),
            kermesses_users::user_id.eq(user_id),
        ))
        .execute(conn)?;

    info!(kermesse_id, user_id, "User linked to kermesse");
    Ok(())
}

/// Links a user to a kermesse unless the link already exists.
///
/// Returns true if a new link was created.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn link_user_if_absent(
    conn: &mut SqliteConnection,
    kermesse_id: i64,
    user_id: i64,
) -> Result<bool, PersistenceError> {
    let inserted: usize = diesel::insert_or_ignore_into(kermesses_users::table)
        .values((
            kermesses_users::kermesse_id.eq(kermesse_id),
            kermesses_users::user_id.eq(user_id),
        ))
        .execute(conn)?;

    if inserted > 0 {
        info!(kermesse_id, user_id, "User linked to kermesse");
    }
    Ok(inserted > 0)
}

/// Links a stand to a kermesse.
///
/// # Errors
///
/// Returns `PersistenceError::Duplicate` if the link already exists.
pub fn link_stand(
    conn: &mut SqliteConnection,
    kermesse_id: i64,
    stand_id: i64,
) -> Result<(), PersistenceError> {
    diesel::insert_into(kermesses_stands::table)
        .values((
            kermesses_stands::kermesse_id.eq(kermesse_id),
            kermesses_stands::stand_id.eq(stand_id),
        ))
        .execute(conn)?;

    info!(kermesse_id, stand_id, "Stand linked to kermesse");
    Ok(())
}
