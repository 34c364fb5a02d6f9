// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use kermesse_domain::Tombola;

use crate::data_models::{TombolaRow, convert_all};
use crate::diesel_schema::tombolas;
use crate::error::PersistenceError;
use crate::filters::TombolaFilter;

/// Retrieves a tombola by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the tombola is not found.
pub fn get_tombola(
    conn: &mut SqliteConnection,
    tombola_id: i64,
) -> Result<Option<Tombola>, PersistenceError> {
    tombolas::table
        .find(tombola_id)
        .select(TombolaRow::as_select())
        .first(conn)
        .optional()?
        .map(Tombola::try_from)
        .transpose()
}

/// Lists tombolas matching `filter`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_tombolas(
    conn: &mut SqliteConnection,
    filter: &TombolaFilter,
) -> Result<Vec<Tombola>, PersistenceError> {
    let mut query = tombolas::table.into_boxed();

    if let Some(kermesse_id) = filter.kermesse_id {
        query = query.filter(tombolas::kermesse_id.eq(kermesse_id));
    }

    let rows: Vec<TombolaRow> = query
        .order(tombolas::tombola_id.asc())
        .select(TombolaRow::as_select())
        .load(conn)?;

    convert_all(rows)
}
