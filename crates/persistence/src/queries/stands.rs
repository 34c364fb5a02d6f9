// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use kermesse_domain::{LifecycleStatus, Stand};
use tracing::debug;

use crate::data_models::{StandRow, convert_all};
use crate::diesel_schema::{kermesses, kermesses_stands, stands};
use crate::error::PersistenceError;
use crate::filters::StandFilter;

/// Retrieves a stand by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the stand is not found.
pub fn get_stand(
    conn: &mut SqliteConnection,
    stand_id: i64,
) -> Result<Option<Stand>, PersistenceError> {
    debug!(stand_id, "Looking up stand");

    stands::table
        .find(stand_id)
        .select(StandRow::as_select())
        .first(conn)
        .optional()?
        .map(Stand::try_from)
        .transpose()
}

/// Retrieves the stand owned by a stand holder.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_stand_by_holder(
    conn: &mut SqliteConnection,
    holder_id: i64,
) -> Result<Option<Stand>, PersistenceError> {
    stands::table
        .filter(stands::holder_id.eq(holder_id))
        .select(StandRow::as_select())
        .first(conn)
        .optional()?
        .map(Stand::try_from)
        .transpose()
}

/// Lists stands matching `filter`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_stands(
    conn: &mut SqliteConnection,
    filter: &StandFilter,
) -> Result<Vec<Stand>, PersistenceError> {
    let mut query = stands::table.into_boxed();

    if let Some(kermesse_id) = filter.kermesse_id {
        query = query.filter(
            stands::stand_id.eq_any(
                kermesses_stands::table
                    .filter(kermesses_stands::kermesse_id.eq(kermesse_id))
                    .select(kermesses_stands::stand_id),
            ),
        );
    }

    if filter.ready_only {
        let running = kermesses::table
            .filter(kermesses::status.eq(LifecycleStatus::Started.as_str()))
            .select(kermesses::kermesse_id);
        query = query.filter(diesel::dsl::not(
            stands::stand_id.eq_any(
                kermesses_stands::table
                    .filter(kermesses_stands::kermesse_id.eq_any(running))
                    .select(kermesses_stands::stand_id),
            ),
        ));
    }

    let rows: Vec<StandRow> = query
        .order(stands::stand_id.asc())
        .select(StandRow::as_select())
        .load(conn)?;

    convert_all(rows)
}
