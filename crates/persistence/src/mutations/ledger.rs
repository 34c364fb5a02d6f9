// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Balance mutation.
//!
//! Every change is a signed delta applied in place (`balance = balance ± n`)
//! with the sufficiency check in the same statement, so two concurrent
//! debits can never both pass against the same funds.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};

use crate::data_models::to_stored;
use crate::diesel_schema::{payment_top_ups, users};
use crate::error::PersistenceError;

fn user_exists(conn: &mut SqliteConnection, user_id: i64) -> Result<bool, PersistenceError> {
    Ok(diesel::select(diesel::dsl::exists(users::table.find(user_id))).get_result(conn)?)
}

/// Debits `amount` from a user's balance if and only if it covers the amount.
///
/// # Errors
///
/// Returns `PersistenceError::InsufficientBalance` if the balance is lower than
/// `amount`, or `PersistenceError::NotFound` if the user does not exist.
pub fn debit(
    conn: &mut SqliteConnection,
    user_id: i64,
    amount: u64,
) -> Result<(), PersistenceError> {
    let delta: i64 = to_stored("amount", amount)?;

    let updated: usize = diesel::update(
        users::table
            .filter(users::user_id.eq(user_id))
            .filter(users::balance.ge(delta)),
    )
    .set(users::balance.eq(users::balance - delta))
    .execute(conn)?;

    if updated == 0 {
        if user_exists(conn, user_id)? {
            debug!(user_id, amount, "Debit rejected: insufficient balance");
            return Err(PersistenceError::InsufficientBalance { user_id, amount });
        }
        return Err(PersistenceError::NotFound(format!("user {user_id}")));
    }

    debug!(user_id, amount, "Balance debited");
    Ok(())
}

/// Credits `amount` to a user's balance.
///
/// # Errors
///
/// Returns `PersistenceError::BalanceOverflow` if the result would not fit,
/// or `PersistenceError::NotFound` if the user does not exist.
pub fn credit(
    conn: &mut SqliteConnection,
    user_id: i64,
    amount: u64,
) -> Result<(), PersistenceError> {
    let delta: i64 = to_stored("amount", amount)?;

    let updated: usize = diesel::update(
        users::table
            .filter(users::user_id.eq(user_id))
            .filter(users::balance.le(i64::MAX - delta)),
    )
    .set(users::balance.eq(users::balance + delta))
    .execute(conn)?;

    if updated == 0 {
        if user_exists(conn, user_id)? {
            return Err(PersistenceError::BalanceOverflow { user_id, amount });
        }
        return Err(PersistenceError::NotFound(format!("user {user_id}")));
    }

    debug!(user_id, amount, "Balance credited");
    Ok(())
}

/// Moves `amount` from one user to another.
///
/// The debit is applied first, so the payer's row is always touched before
/// the payee's.
///
/// # Errors
///
/// Returns any error from [`debit`] or [`credit`]. The caller's transaction
/// must roll back on error so a debit is never left without its credit.
pub fn transfer(
    conn: &mut SqliteConnection,
    from_user_id: i64,
    to_user_id: i64,
    amount: u64,
) -> Result<(), PersistenceError> {
    debit(conn, from_user_id, amount)?;
    credit(conn, to_user_id, amount)?;

    info!(from_user_id, to_user_id, amount, "Balance transferred");
    Ok(())
}

/// Records an externally confirmed payment and credits the user.
///
/// # Errors
///
/// Returns `PersistenceError::Duplicate` if `reference` was already recorded.
pub fn record_top_up(
    conn: &mut SqliteConnection,
    user_id: i64,
    amount: u64,
    reference: &str,
) -> Result<i64, PersistenceError> {
    let stored_amount: i64 = to_stored("amount", amount)?;

    let top_up_id: i64 = diesel::insert_into(payment_top_ups::table)
        .values((
            payment_top_ups::user_id.eq(user_id),
            payment_top_ups::amount.eq(stored_amount),
            payment_top_ups::reference.eq(reference),
        ))
        .returning(payment_top_ups::top_up_id)
        .get_result(conn)?;

    credit(conn, user_id, amount)?;

    info!(top_up_id, user_id, amount, reference, "Top-up recorded");
    Ok(top_up_id)
}
