// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::info;

use crate::data_models::{NewStand, to_stored};
use crate::diesel_schema::stands;
use crate::error::PersistenceError;

/// Creates a stand.
///
/// # Errors
///
/// Returns `PersistenceError::Duplicate` if the holder already owns a stand.
pub fn create_stand(
    conn: &mut SqliteConnection,
    new_stand: &NewStand<'_>,
) -> Result<i64, PersistenceError> {
    let stand_id: i64 = diesel::insert_into(stands::table)
        .values((
            stands::holder_id.eq(new_stand.holder_id),
            stands::name.eq(new_stand.name),
            stands::description.eq(new_stand.description),
            stands::category.eq(new_stand.category.as_str()),
            stands::price.eq(to_stored("price", new_stand.price)?),
            stands::stock.eq(to_stored("stock", new_stand.stock)?),
        ))
        .returning(stands::stand_id)
        .get_result(conn)?;

    info!(stand_id, holder_id = new_stand.holder_id, "Stand created");
    Ok(stand_id)
}

/// Updates the descriptive fields and price of a stand.
///
/// Stock is not touched here; it only moves through inventory adjustments.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the stand does not exist.
pub fn update_stand(
    conn: &mut SqliteConnection,
    stand_id: i64,
    name: &str,
    description: &str,
    price: u64,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(stands::table.find(stand_id))
        .set((
            stands::name.eq(name),
            stands::description.eq(description),
            stands::price.eq(to_stored("price", price)?),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("stand {stand_id}")));
    }

    info!(stand_id, "Stand updated");
    Ok(())
}
