// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use kermesse_domain::Ticket;

use crate::data_models::TicketRow;
use crate::diesel_schema::{kermesses, tickets, tombolas, users};
use crate::error::PersistenceError;
use crate::filters::{ActorScope, TicketFilter};

/// Retrieves a ticket by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the ticket is not found.
pub fn get_ticket(
    conn: &mut SqliteConnection,
    ticket_id: i64,
) -> Result<Option<Ticket>, PersistenceError> {
    Ok(tickets::table
        .find(ticket_id)
        .select(TicketRow::as_select())
        .first(conn)
        .optional()?
        .map(Ticket::from))
}

/// Lists the ids of every ticket sold for a tombola, in sale order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn ticket_ids_for_tombola(
    conn: &mut SqliteConnection,
    tombola_id: i64,
) -> Result<Vec<i64>, PersistenceError> {
    Ok(tickets::table
        .filter(tickets::tombola_id.eq(tombola_id))
        .order(tickets::ticket_id.asc())
        .select(tickets::ticket_id)
        .load(conn)?)
}

/// Counts winning tickets of a tombola.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_winners(
    conn: &mut SqliteConnection,
    tombola_id: i64,
) -> Result<i64, PersistenceError> {
    Ok(tickets::table
        .filter(tickets::tombola_id.eq(tombola_id))
        .filter(tickets::is_winner.eq(true))
        .count()
        .get_result(conn)?)
}

/// Lists tickets visible under `filter`.
///
/// Stand holders have no tickets in scope.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_tickets(
    conn: &mut SqliteConnection,
    filter: &TicketFilter,
) -> Result<Vec<Ticket>, PersistenceError> {
    let mut query = tickets::table.into_boxed();

    if let Some(tombola_id) = filter.tombola_id {
        query = query.filter(tickets::tombola_id.eq(tombola_id));
    }

    match filter.scope {
        ActorScope::All => {}
        ActorScope::StandHolder(_) => return Ok(Vec::new()),
        ActorScope::Organizer(organizer_id) => {
            let owned_kermesses = kermesses::table
                .filter(kermesses::organizer_id.eq(organizer_id))
                .select(kermesses::kermesse_id);
            query = query.filter(
                tickets::tombola_id.eq_any(
                    tombolas::table
                        .filter(tombolas::kermesse_id.eq_any(owned_kermesses))
                        .select(tombolas::tombola_id),
                ),
            );
        }
        ActorScope::Student(user_id) => {
            query = query.filter(tickets::user_id.eq(user_id));
        }
        ActorScope::Parent(parent_id) => {
            query = query.filter(
                tickets::user_id.eq_any(
                    users::table
                        .filter(users::parent_id.eq(Some(parent_id)))
                        .select(users::user_id),
                ),
            );
        }
    }

    Ok(query
        .order(tickets::ticket_id.asc())
        .select(TicketRow::as_select())
        .load(conn)?
        .into_iter()
        .map(Ticket::from)
        .collect())
}
