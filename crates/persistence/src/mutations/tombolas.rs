// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use kermesse_domain::LifecycleStatus;
use tracing::info;

use crate::data_models::{NewTombola, to_stored};
use crate::diesel_schema::tombolas;
use crate::error::PersistenceError;

/// Creates a running tombola.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_tombola(
    conn: &mut SqliteConnection,
    new: &NewTombola<'_>,
) -> Result<i64, PersistenceError> {
    let tombola_id: i64 = diesel::insert_into(tombolas::table)
        .values((
            tombolas::kermesse_id.eq(new.kermesse_id),
            tombolas::name.eq(new.name),
            tombolas::prize.eq(new.prize),
            tombolas::price.eq(to_stored("price", new.price)?),
            tombolas::status.eq(LifecycleStatus::Started.as_str()),
        ))
        .returning(tombolas::tombola_id)
        .get_result(conn)?;

    info!(tombola_id, kermesse_id = new.kermesse_id, "Tombola created");
    Ok(tombola_id)
}

/// Updates the fields of a running tombola.
///
/// # Errors
///
/// Returns `PersistenceError::AlreadyFinished` if the tombola is not running.
pub fn update_tombola(
    conn: &mut SqliteConnection,
    tombola_id: i64,
    name: &str,
    prize: &str,
    price: u64,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(
        tombolas::table
            .filter(tombolas::tombola_id.eq(tombola_id))
            .filter(tombolas::status.eq(LifecycleStatus::Started.as_str())),
    )
    .set((
        tombolas::name.eq(name),
        tombolas::prize.eq(prize),
        tombolas::price.eq(to_stored("price", price)?),
    ))
    .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::AlreadyFinished {
            resource: "tombola",
            id: tombola_id,
        });
    }

    info!(tombola_id, "Tombola updated");
    Ok(())
}

/// Moves a running tombola to `FINISHED`.
///
/// # Errors
///
/// Returns `PersistenceError::AlreadyFinished` if it was not running.
pub fn finish_tombola(
    conn: &mut SqliteConnection,
    tombola_id: i64,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(
        tombolas::table
            .filter(tombolas::tombola_id.eq(tombola_id))
            .filter(tombolas::status.eq(LifecycleStatus::Started.as_str())),
    )
    .set(tombolas::status.eq(LifecycleStatus::Finished.as_str()))
    .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::AlreadyFinished {
            resource: "tombola",
            id: tombola_id,
        });
    }

    info!(tombola_id, "Tombola finished");
    Ok(())
}
