// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use kermesse_domain::{Kermesse, LifecycleStatus, User, UserRole};
use tracing::debug;

use crate::data_models::{KermesseRow, UserRow, convert_all};
use crate::diesel_schema::{kermesses, kermesses_stands, kermesses_users, stands, users};
use crate::error::PersistenceError;
use crate::filters::{ActorScope, KermesseFilter};

/// Retrieves a kermesse by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the kermesse is not found.
pub fn get_kermesse(
    conn: &mut SqliteConnection,
    kermesse_id: i64,
) -> Result<Option<Kermesse>, PersistenceError> {
    debug!(kermesse_id, "Looking up kermesse");

    kermesses::table
        .find(kermesse_id)
        .select(KermesseRow::as_select())
        .first(conn)
        .optional()?
        .map(Kermesse::try_from)
        .transpose()
}

/// Lists kermesses visible under `filter`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_kermesses(
    conn: &mut SqliteConnection,
    filter: &KermesseFilter,
) -> Result<Vec<Kermesse>, PersistenceError> {
    let mut query = kermesses::table.into_boxed();

    match filter.scope {
        ActorScope::All => {}
        ActorScope::Organizer(organizer_id) => {
            query = query.filter(kermesses::organizer_id.eq(organizer_id));
        }
        ActorScope::StandHolder(holder_id) => {
            let holder_stands = stands::table
                .filter(stands::holder_id.eq(holder_id))
                .select(stands::stand_id);
            query = query.filter(
                kermesses::kermesse_id.eq_any(
                    kermesses_stands::table
                        .filter(kermesses_stands::stand_id.eq_any(holder_stands))
                        .select(kermesses_stands::kermesse_id),
                ),
            );
        }
        ActorScope::Student(user_id) => {
            query = query.filter(
                kermesses::kermesse_id.eq_any(
                    kermesses_users::table
                        .filter(kermesses_users::user_id.eq(user_id))
                        .select(kermesses_users::kermesse_id),
                ),
            );
        }
        ActorScope::Parent(parent_id) => {
            let children = users::table
                .filter(users::parent_id.eq(Some(parent_id)))
                .select(users::user_id);
            query = query.filter(
                kermesses::kermesse_id.eq_any(
                    kermesses_users::table
                        .filter(
                            kermesses_users::user_id
                                .eq(parent_id)
                                .or(kermesses_users::user_id.eq_any(children)),
                        )
                        .select(kermesses_users::kermesse_id),
                ),
            );
        }
    }

    let rows: Vec<KermesseRow> = query
        .order(kermesses::kermesse_id.asc())
        .select(KermesseRow::as_select())
        .load(conn)?;

    convert_all(rows)
}

/// Returns true if the user is linked to the kermesse.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn is_user_linked(
    conn: &mut SqliteConnection,
    kermesse_id: i64,
    user_id: i64,
) -> Result<bool, PersistenceError> {
    Ok(diesel::select(diesel::dsl::exists(
        kermesses_users::table
            .filter(kermesses_users::kermesse_id.eq(kermesse_id))
            .filter(kermesses_users::user_id.eq(user_id)),
    ))
    .get_result(conn)?)
}

/// Lists every kermesse the stand is linked to, running or not.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn kermesses_for_stand(
    conn: &mut SqliteConnection,
    stand_id: i64,
) -> Result<Vec<Kermesse>, PersistenceError> {
    let rows: Vec<KermesseRow> = kermesses::table
        .filter(
            kermesses::kermesse_id.eq_any(
                kermesses_stands::table
                    .filter(kermesses_stands::stand_id.eq(stand_id))
                    .select(kermesses_stands::kermesse_id),
            ),
        )
        .order(kermesses::kermesse_id.asc())
        .select(KermesseRow::as_select())
        .load(conn)?;

    convert_all(rows)
}

/// Returns the running kermesse the stand is linked to, if any.
///
/// A stand is linked to at most one running kermesse at a time.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn running_kermesse_for_stand(
    conn: &mut SqliteConnection,
    stand_id: i64,
) -> Result<Option<Kermesse>, PersistenceError> {
    Ok(kermesses_for_stand(conn, stand_id)?
        .into_iter()
        .find(|k| k.status == LifecycleStatus::Started))
}

/// Lists students not yet linked to the kermesse.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn users_for_invitation(
    conn: &mut SqliteConnection,
    kermesse_id: i64,
) -> Result<Vec<User>, PersistenceError> {
    let linked = kermesses_users::table
        .filter(kermesses_users::kermesse_id.eq(kermesse_id))
        .select(kermesses_users::user_id);

    users::table
        .filter(users::role.eq(UserRole::Student.as_str()))
        .filter(diesel::dsl::not(users::user_id.eq_any(linked)))
        .order(users::user_id.asc())
        .select(UserRow::as_select())
        .load(conn)?
        .into_iter()
        .map(UserRow::into_user)
        .collect()
}
