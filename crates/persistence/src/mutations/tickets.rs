// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::info;

use crate::diesel_schema::tickets;
use crate::error::PersistenceError;

/// Inserts a non-winning ticket.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_ticket(
    conn: &mut SqliteConnection,
    tombola_id: i64,
    user_id: i64,
) -> Result<i64, PersistenceError> {
    let ticket_id: i64 = diesel::insert_into(tickets::table)
        .values((
            tickets::tombola_id.eq(tombola_id),
            tickets::user_id.eq(user_id),
            tickets::is_winner.eq(false),
        ))
        .returning(tickets::ticket_id)
        .get_result(conn)?;

    info!(ticket_id, tombola_id, user_id, "Ticket sold");
    Ok(ticket_id)
}

/// Flags a ticket of `tombola_id` as the winner.
///
/// # Errors
///
/// Returns `PersistenceError::WinnerNotRecorded` if the ticket does not belong
/// to the tombola or is already flagged, and `PersistenceError::Duplicate` if
/// another ticket of the tombola already won.
pub fn mark_winner(
    conn: &mut SqliteConnection,
    tombola_id: i64,
    ticket_id: i64,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(
        tickets::table
            .filter(tickets::ticket_id.eq(ticket_id))
            .filter(tickets::tombola_id.eq(tombola_id))
            .filter(tickets::is_winner.eq(false)),
    )
    .set(tickets::is_winner.eq(true))
    .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::WinnerNotRecorded {
            tombola_id,
            ticket_id,
        });
    }

    info!(tombola_id, ticket_id, "Winning ticket drawn");
    Ok(())
}
