// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use kermesse_domain::Participation;

use crate::data_models::{ParticipationRow, convert_all};
use crate::diesel_schema::{kermesses, participations, stands, users};
use crate::error::PersistenceError;
use crate::filters::{ActorScope, ParticipationFilter};

/// Retrieves a participation by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the participation is not found.
pub fn get_participation(
    conn: &mut SqliteConnection,
    participation_id: i64,
) -> Result<Option<Participation>, PersistenceError> {
    participations::table
        .find(participation_id)
        .select(ParticipationRow::as_select())
        .first(conn)
        .optional()?
        .map(Participation::try_from)
        .transpose()
}

/// Lists participations visible under `filter`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_participations(
    conn: &mut SqliteConnection,
    filter: &ParticipationFilter,
) -> Result<Vec<Participation>, PersistenceError> {
    let mut query = participations::table.into_boxed();

    if let Some(kermesse_id) = filter.kermesse_id {
        query = query.filter(participations::kermesse_id.eq(kermesse_id));
    }

    match filter.scope {
        ActorScope::All => {}
        ActorScope::Organizer(organizer_id) => {
            query = query.filter(
                participations::kermesse_id.eq_any(
                    kermesses::table
                        .filter(kermesses::organizer_id.eq(organizer_id))
                        .select(kermesses::kermesse_id),
                ),
            );
        }
        ActorScope::StandHolder(holder_id) => {
            query = query.filter(
                participations::stand_id.eq_any(
                    stands::table
                        .filter(stands::holder_id.eq(holder_id))
                        .select(stands::stand_id),
                ),
            );
        }
        ActorScope::Student(user_id) => {
            query = query.filter(participations::user_id.eq(user_id));
        }
        ActorScope::Parent(parent_id) => {
            query = query.filter(
                participations::user_id.eq(parent_id).or(participations::user_id.eq_any(
                    users::table
                        .filter(users::parent_id.eq(Some(parent_id)))
                        .select(users::user_id),
                )),
            );
        }
    }

    let rows: Vec<ParticipationRow> = query
        .order(participations::participation_id.asc())
        .select(ParticipationRow::as_select())
        .load(conn)?;

    convert_all(rows)
}
