// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row models and their mapping to domain entities.

use diesel::prelude::*;
use kermesse_domain::{
    Kermesse, LifecycleStatus, Participation, Stand, StandCategory, Ticket, Tombola, User,
    UserRole,
};
use num_traits::ToPrimitive;
use std::str::FromStr;

use crate::diesel_schema::{kermesses, participations, stands, tickets, tombolas, users};
use crate::error::PersistenceError;

/// A user together with the stored password hash.
///
/// Only credential checks need the hash; everything else uses [`User`].
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Values for a new user row.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub parent_id: Option<i64>,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: UserRole,
}

/// Values for a new stand row.
#[derive(Debug, Clone)]
pub struct NewStand<'a> {
    pub holder_id: i64,
    pub name: &'a str,
    pub description: &'a str,
    pub category: StandCategory,
    pub price: u64,
    pub stock: u64,
}

/// Values for a new participation row.
#[derive(Debug, Clone, Copy)]
pub struct NewParticipation {
    pub kermesse_id: i64,
    pub stand_id: i64,
    pub user_id: i64,
    pub category: StandCategory,
    pub quantity: u32,
    pub balance: u64,
    pub status: LifecycleStatus,
}

/// Values for a new tombola row.
#[derive(Debug, Clone)]
pub struct NewTombola<'a> {
    pub kermesse_id: i64,
    pub name: &'a str,
    pub prize: &'a str,
    pub price: u64,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct UserRow {
    user_id: i64,
    parent_id: Option<i64>,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    balance: i64,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = kermesses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct KermesseRow {
    kermesse_id: i64,
    organizer_id: i64,
    name: String,
    description: String,
    status: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = stands)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct StandRow {
    stand_id: i64,
    holder_id: i64,
    name: String,
    description: String,
    category: String,
    price: i64,
    stock: i64,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = participations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ParticipationRow {
    participation_id: i64,
    kermesse_id: i64,
    stand_id: i64,
    user_id: i64,
    category: String,
    quantity: i32,
    balance: i64,
    points: i32,
    status: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = tombolas)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct TombolaRow {
    tombola_id: i64,
    kermesse_id: i64,
    name: String,
    prize: String,
    price: i64,
    status: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = tickets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct TicketRow {
    ticket_id: i64,
    user_id: i64,
    tombola_id: i64,
    is_winner: bool,
}

fn corrupt(table: &str, id: i64, detail: impl std::fmt::Display) -> PersistenceError {
    PersistenceError::CorruptRow(format!("{table} row {id}: {detail}"))
}

fn to_u64(table: &str, id: i64, column: &str, value: i64) -> Result<u64, PersistenceError> {
    value
        .to_u64()
        .ok_or_else(|| corrupt(table, id, format!("negative {column} {value}")))
}

fn to_u32(table: &str, id: i64, column: &str, value: i32) -> Result<u32, PersistenceError> {
    value
        .to_u32()
        .ok_or_else(|| corrupt(table, id, format!("negative {column} {value}")))
}

/// Converts a domain amount to its stored representation.
///
/// # Errors
///
/// Returns `PersistenceError::QueryFailed` if the amount exceeds `i64::MAX`.
pub(crate) fn to_stored(column: &str, value: u64) -> Result<i64, PersistenceError> {
    value
        .to_i64()
        .ok_or_else(|| PersistenceError::QueryFailed(format!("{column} {value} is out of range")))
}

/// Converts a domain count to its stored representation.
///
/// # Errors
///
/// Returns `PersistenceError::QueryFailed` if the value exceeds `i32::MAX`.
pub(crate) fn to_stored_small(column: &str, value: u32) -> Result<i32, PersistenceError> {
    value
        .to_i32()
        .ok_or_else(|| PersistenceError::QueryFailed(format!("{column} {value} is out of range")))
}

impl UserRow {
    pub(crate) fn into_credentials(self) -> Result<UserCredentials, PersistenceError> {
        let role: UserRole =
            UserRole::from_str(&self.role).map_err(|e| corrupt("users", self.user_id, e))?;
        let balance: u64 = to_u64("users", self.user_id, "balance", self.balance)?;

        Ok(UserCredentials {
            user: User {
                user_id: self.user_id,
                parent_id: self.parent_id,
                name: self.name,
                email: self.email,
                role,
                balance,
            },
            password_hash: self.password_hash,
        })
    }

    pub(crate) fn into_user(self) -> Result<User, PersistenceError> {
        self.into_credentials().map(|c| c.user)
    }
}

impl TryFrom<KermesseRow> for Kermesse {
    type Error = PersistenceError;

    fn try_from(row: KermesseRow) -> Result<Self, Self::Error> {
        let status: LifecycleStatus = LifecycleStatus::from_str(&row.status)
            .map_err(|e| corrupt("kermesses", row.kermesse_id, e))?;

        Ok(Self {
            kermesse_id: row.kermesse_id,
            organizer_id: row.organizer_id,
            name: row.name,
            description: row.description,
            status,
        })
    }
}

impl TryFrom<StandRow> for Stand {
    type Error = PersistenceError;

    fn try_from(row: StandRow) -> Result<Self, Self::Error> {
        let category: StandCategory = StandCategory::from_str(&row.category)
            .map_err(|e| corrupt("stands", row.stand_id, e))?;

        Ok(Self {
            stand_id: row.stand_id,
            holder_id: row.holder_id,
            price: to_u64("stands", row.stand_id, "price", row.price)?,
            stock: to_u64("stands", row.stand_id, "stock", row.stock)?,
            name: row.name,
            description: row.description,
            category,
        })
    }
}

impl TryFrom<ParticipationRow> for Participation {
    type Error = PersistenceError;

    fn try_from(row: ParticipationRow) -> Result<Self, Self::Error> {
        let id: i64 = row.participation_id;
        let category: StandCategory =
            StandCategory::from_str(&row.category).map_err(|e| corrupt("participations", id, e))?;
        let status: LifecycleStatus =
            LifecycleStatus::from_str(&row.status).map_err(|e| corrupt("participations", id, e))?;

        Ok(Self {
            participation_id: id,
            kermesse_id: row.kermesse_id,
            stand_id: row.stand_id,
            user_id: row.user_id,
            category,
            quantity: to_u32("participations", id, "quantity", row.quantity)?,
            balance: to_u64("participations", id, "balance", row.balance)?,
            points: to_u32("participations", id, "points", row.points)?,
            status,
        })
    }
}

impl TryFrom<TombolaRow> for Tombola {
    type Error = PersistenceError;

    fn try_from(row: TombolaRow) -> Result<Self, Self::Error> {
        let status: LifecycleStatus = LifecycleStatus::from_str(&row.status)
            .map_err(|e| corrupt("tombolas", row.tombola_id, e))?;

        Ok(Self {
            tombola_id: row.tombola_id,
            kermesse_id: row.kermesse_id,
            price: to_u64("tombolas", row.tombola_id, "price", row.price)?,
            name: row.name,
            prize: row.prize,
            status,
        })
    }
}

impl From<TicketRow> for Ticket {
    fn from(row: TicketRow) -> Self {
        Self {
            ticket_id: row.ticket_id,
            user_id: row.user_id,
            tombola_id: row.tombola_id,
            is_winner: row.is_winner,
        }
    }
}

/// Converts a batch of rows, failing on the first corrupt one.
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, PersistenceError>
where
    T: TryFrom<R, Error = PersistenceError>,
{
    rows.into_iter().map(T::try_from).collect()
}
