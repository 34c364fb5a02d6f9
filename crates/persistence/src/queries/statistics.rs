// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-kermesse statistics.

use diesel::SqliteConnection;
use diesel::dsl::{sql, sum};
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use kermesse_domain::KermesseStatistics;
use num_traits::ToPrimitive;

use crate::diesel_schema::{
    kermesses_stands, kermesses_users, participations, stands, tickets, tombolas, users,
};
use crate::error::PersistenceError;
use crate::filters::ActorScope;

/// Converts an aggregate read back from the database into an amount.
///
/// # Errors
///
/// Returns `PersistenceError::CorruptRow` if the value is negative.
pub(crate) fn to_amount(column: &str, value: i64) -> Result<u64, PersistenceError> {
    value
        .to_u64()
        .ok_or_else(|| PersistenceError::CorruptRow(format!("{column} aggregate is {value}")))
}

/// Computes statistics for a kermesse as seen by `scope`.
///
/// Parents only count their own children among linked users, stand
/// holders only see their own stand's participations, students get their
/// own points and only organizers see tombola revenue.
///
/// # Errors
///
/// Returns an error if any of the underlying queries fails.
pub fn kermesse_statistics(
    conn: &mut SqliteConnection,
    kermesse_id: i64,
    scope: ActorScope,
) -> Result<KermesseStatistics, PersistenceError> {
    let mut linked_users = kermesses_users::table
        .filter(kermesses_users::kermesse_id.eq(kermesse_id))
        .into_boxed();
    if let ActorScope::Parent(parent_id) = scope {
        linked_users = linked_users.filter(
            kermesses_users::user_id.eq_any(
                users::table
                    .filter(users::parent_id.eq(Some(parent_id)))
                    .select(users::user_id),
            ),
        );
    }
    let user_count: i64 = linked_users.count().get_result(conn)?;

    let stand_count: i64 = kermesses_stands::table
        .filter(kermesses_stands::kermesse_id.eq(kermesse_id))
        .count()
        .get_result(conn)?;

    let tombola_count: i64 = tombolas::table
        .filter(tombolas::kermesse_id.eq(kermesse_id))
        .count()
        .get_result(conn)?;

    let tombola_revenue: i64 = match scope {
        ActorScope::Organizer(_) | ActorScope::All => tickets::table
            .inner_join(tombolas::table)
            .filter(tombolas::kermesse_id.eq(kermesse_id))
            // SUM of a BIGINT column maps to Numeric in Diesel.
            .select(sql::<BigInt>("COALESCE(SUM(tombolas.price), 0)"))
            .get_result(conn)?,
        _ => 0,
    };

    let mut visible = participations::table
        .filter(participations::kermesse_id.eq(kermesse_id))
        .into_boxed();
    if let ActorScope::StandHolder(holder_id) = scope {
        visible = visible.filter(
            participations::stand_id.eq_any(
                stands::table
                    .filter(stands::holder_id.eq(holder_id))
                    .select(stands::stand_id),
            ),
        );
    }
    let (participation_count, participation_revenue): (i64, i64) = visible
        .select((
            diesel::dsl::count_star(),
            sql::<BigInt>("COALESCE(SUM(participations.balance), 0)"),
        ))
        .get_result(conn)?;

    let points: Option<i64> = match scope {
        ActorScope::Student(user_id) => participations::table
            .filter(participations::kermesse_id.eq(kermesse_id))
            .filter(participations::user_id.eq(user_id))
            .select(sum(participations::points))
            .get_result(conn)?,
        _ => None,
    };

    Ok(KermesseStatistics {
        user_count: to_amount("kermesses_users", user_count)?,
        stand_count: to_amount("kermesses_stands", stand_count)?,
        tombola_count: to_amount("tombolas", tombola_count)?,
        tombola_revenue: to_amount("tombolas.price", tombola_revenue)?,
        participation_count: to_amount("participations", participation_count)?,
        participation_revenue: to_amount("participations.balance", participation_revenue)?,
        points: to_amount("participations.points", points.unwrap_or(0))?,
    })
}
