// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use kermesse_domain::LifecycleStatus;
use tracing::info;

use crate::data_models::{NewParticipation, to_stored, to_stored_small};
use crate::diesel_schema::participations;
use crate::error::PersistenceError;

/// Inserts a participation row.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_participation(
    conn: &mut SqliteConnection,
    new: &NewParticipation,
) -> Result<i64, PersistenceError> {
    let participation_id: i64 = diesel::insert_into(participations::table)
        .values((
            participations::kermesse_id.eq(new.kermesse_id),
            participations::stand_id.eq(new.stand_id),
            participations::user_id.eq(new.user_id),
            participations::category.eq(new.category.as_str()),
            participations::quantity.eq(to_stored_small("quantity", new.quantity)?),
            participations::balance.eq(to_stored("balance", new.balance)?),
            participations::points.eq(0),
            participations::status.eq(new.status.as_str()),
        ))
        .returning(participations::participation_id)
        .get_result(conn)?;

    info!(
        participation_id,
        kermesse_id = new.kermesse_id,
        stand_id = new.stand_id,
        user_id = new.user_id,
        balance = new.balance,
        "Participation recorded"
    );
    Ok(participation_id)
}

/// Records the outcome of a running participation.
///
/// # Errors
///
/// Returns `PersistenceError::AlreadyFinished` if the outcome was already recorded.
pub fn record_outcome(
    conn: &mut SqliteConnection,
    participation_id: i64,
    points: u32,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(
        participations::table
            .filter(participations::participation_id.eq(participation_id))
            .filter(participations::status.eq(LifecycleStatus::Started.as_str())),
    )
    .set((
        participations::points.eq(to_stored_small("points", points)?),
        participations::status.eq(LifecycleStatus::Finished.as_str()),
    ))
    .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::AlreadyFinished {
            resource: "participation",
            id: participation_id,
        });
    }

    info!(participation_id, points, "Participation outcome recorded");
    Ok(())
}
