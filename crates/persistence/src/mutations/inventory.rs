// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Stand stock mutation.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::diesel_schema::stands;
use crate::error::PersistenceError;

/// Applies a signed stock delta to a stand.
///
/// A negative delta only applies if the stand holds at least that many
/// units; stock can never drop below zero.
///
/// # Errors
///
/// Returns `PersistenceError::InsufficientStock` when a decrement would go
/// negative, `PersistenceError::StockOverflow` when an increment would not
/// fit, or `PersistenceError::NotFound` if the stand does not exist.
pub fn adjust_stock(
    conn: &mut SqliteConnection,
    stand_id: i64,
    delta: i64,
) -> Result<(), PersistenceError> {
    if delta == 0 {
        return Ok(());
    }

    let magnitude: i64 = delta.checked_abs().ok_or(PersistenceError::InsufficientStock {
        stand_id,
        requested: delta.unsigned_abs(),
    })?;

    let updated: usize = if delta < 0 {
        diesel::update(
            stands::table
                .filter(stands::stand_id.eq(stand_id))
                .filter(stands::stock.ge(magnitude)),
        )
        .set(stands::stock.eq(stands::stock - magnitude))
        .execute(conn)?
    } else {
        diesel::update(
            stands::table
                .filter(stands::stand_id.eq(stand_id))
                .filter(stands::stock.le(i64::MAX - magnitude)),
        )
        .set(stands::stock.eq(stands::stock + magnitude))
        .execute(conn)?
    };

    if updated == 0 {
        let exists: bool =
            diesel::select(diesel::dsl::exists(stands::table.find(stand_id))).get_result(conn)?;
        if !exists {
            return Err(PersistenceError::NotFound(format!("stand {stand_id}")));
        }
        return Err(if delta < 0 {
            PersistenceError::InsufficientStock {
                stand_id,
                requested: delta.unsigned_abs(),
            }
        } else {
            PersistenceError::StockOverflow {
                stand_id,
                amount: delta.unsigned_abs(),
            }
        });
    }

    debug!(stand_id, delta, "Stock adjusted");
    Ok(())
}
