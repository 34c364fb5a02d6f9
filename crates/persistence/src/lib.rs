// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the kermesse engine.
//!
//! This crate owns the transactional store: users and their balances,
//! kermesses, stands and their stock, participations, tombolas and
//! tickets. It is built on Diesel over `SQLite`.
//!
//! ## Transactions
//!
//! All access goes through a [`StoreTransaction`]:
//!
//! - [`Persistence::immediate_transaction`] opens `BEGIN IMMEDIATE`, taking
//!   the database write lock before the first read. Every check made inside
//!   the closure therefore sees the latest committed state and nothing can
//!   change it until commit. Returning `Err` rolls everything back.
//! - [`Persistence::read`] opens a deferred transaction for consistent
//!   multi-query reads.
//!
//! ## Ledger and inventory
//!
//! Balances and stock are never written from a value computed in Rust.
//! `mutations::ledger` and `mutations::inventory` apply signed deltas with
//! the sufficiency check folded into the `UPDATE` itself.
//!
//! ## Testing
//!
//! `Persistence::new_in_memory` gives every caller its own shared-cache
//! in-memory database, so tests are isolated without touching the disk.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use diesel::connection::Connection;
use kermesse_domain::{Kermesse, KermesseStatistics, Participation, Stand, Ticket, Tombola, User};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::backend::sqlite::Storage;

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod filters;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{NewParticipation, NewStand, NewTombola, NewUser, UserCredentials};
pub use error::PersistenceError;
pub use filters::{
    ActorScope, KermesseFilter, ParticipationFilter, StandFilter, TicketFilter, TombolaFilter,
};

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter over a single `SQLite` connection.
pub struct Persistence {
    conn: SqliteConnection,
}

/// Carries either the caller's error or a Diesel error out of a Diesel transaction.
enum TxError<E> {
    Caller(E),
    Diesel(diesel::result::Error),
}

impl<E> From<diesel::result::Error> for TxError<E> {
    fn from(err: diesel::result::Error) -> Self {
        Self::Diesel(err)
    }
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url = format!("file:kermesse_memdb_{db_id}?mode=memory&cache=shared");

        let conn: SqliteConnection =
            backend::sqlite::open_connection(&shared_memory_url, Storage::Memory)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// Several adapters may open the same file; their write transactions
    /// are serialized by the database lock.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let conn: SqliteConnection = backend::sqlite::open_connection(path_str, Storage::File)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    /// Runs `f` inside a `BEGIN IMMEDIATE` transaction.
    ///
    /// The write lock is held from the first statement to commit, so
    /// check-then-write sequences inside `f` cannot interleave with another
    /// writer. Any `Err` from `f` rolls back every write made in it.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `f`, or a `PersistenceError` converted
    /// into `E` if the transaction itself cannot begin or commit.
    pub fn immediate_transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut StoreTransaction<'_>) -> Result<T, E>,
        E: From<PersistenceError>,
    {
        self.conn
            .immediate_transaction::<T, TxError<E>, _>(|conn| {
                let mut tx = StoreTransaction { conn };
                f(&mut tx).map_err(TxError::Caller)
            })
            .map_err(|err| match err {
                TxError::Caller(err) => err,
                TxError::Diesel(err) => E::from(PersistenceError::from(err)),
            })
    }

    /// Runs read-only work inside a deferred transaction.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `f`, or a `PersistenceError` converted
    /// into `E` if the transaction cannot begin.
    pub fn read<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut StoreTransaction<'_>) -> Result<T, E>,
        E: From<PersistenceError>,
    {
        self.conn
            .transaction::<T, TxError<E>, _>(|conn| {
                let mut tx = StoreTransaction { conn };
                f(&mut tx).map_err(TxError::Caller)
            })
            .map_err(|err| match err {
                TxError::Caller(err) => err,
                TxError::Diesel(err) => E::from(PersistenceError::from(err)),
            })
    }
}

/// Handle to the store inside an open transaction.
///
/// Every method dispatches to a `queries::*` or `mutations::*` function on
/// the transaction's connection.
pub struct StoreTransaction<'c> {
    conn: &'c mut SqliteConnection,
}

impl StoreTransaction<'_> {
    // ========================================================================
    // Users
    // ========================================================================

    /// Retrieves a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user(&mut self, user_id: i64) -> Result<Option<User>, PersistenceError> {
        queries::users::get_user(self.conn, user_id)
    }

    /// Retrieves a user and password hash by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_credentials_by_email(
        &mut self,
        email: &str,
    ) -> Result<Option<UserCredentials>, PersistenceError> {
        queries::users::get_credentials_by_email(self.conn, email)
    }

    /// Retrieves a user and password hash by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_credentials(
        &mut self,
        user_id: i64,
    ) -> Result<Option<UserCredentials>, PersistenceError> {
        queries::users::get_credentials(self.conn, user_id)
    }

    /// Returns true if the email is taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn email_exists(&mut self, email: &str) -> Result<bool, PersistenceError> {
        queries::users::email_exists(self.conn, email)
    }

    /// Lists the children of a parent.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_children(&mut self, parent_id: i64) -> Result<Vec<User>, PersistenceError> {
        queries::users::list_children(self.conn, parent_id)
    }

    /// Sums all user balances.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    #[cfg(test)]
    pub fn total_balance(&mut self) -> Result<u64, PersistenceError> {
        queries::users::total_balance(self.conn)
    }

    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Duplicate` if the email is taken.
    pub fn create_user(&mut self, new_user: &NewUser<'_>) -> Result<i64, PersistenceError> {
        mutations::users::create_user(self.conn, new_user)
    }

    /// Replaces a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist.
    pub fn update_password_hash(
        &mut self,
        user_id: i64,
        password_hash: &str,
    ) -> Result<(), PersistenceError> {
        mutations::users::update_password_hash(self.conn, user_id, password_hash)
    }

    // ========================================================================
    // Ledger & Inventory
    // ========================================================================

    /// Debits a balance if it covers `amount`.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::InsufficientBalance` if it does not.
    pub fn debit(&mut self, user_id: i64, amount: u64) -> Result<(), PersistenceError> {
        mutations::ledger::debit(self.conn, user_id, amount)
    }

    /// Credits a balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the balance would overflow.
    pub fn credit(&mut self, user_id: i64, amount: u64) -> Result<(), PersistenceError> {
        mutations::ledger::credit(self.conn, user_id, amount)
    }

    /// Moves `amount` between two users.
    ///
    /// # Errors
    ///
    /// Returns any debit or credit error.
    pub fn transfer(
        &mut self,
        from_user_id: i64,
        to_user_id: i64,
        amount: u64,
    ) -> Result<(), PersistenceError> {
        mutations::ledger::transfer(self.conn, from_user_id, to_user_id, amount)
    }

    /// Records an external top-up and credits the user.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Duplicate` if the reference was already recorded.
    pub fn record_top_up(
        &mut self,
        user_id: i64,
        amount: u64,
        reference: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::ledger::record_top_up(self.conn, user_id, amount, reference)
    }

    /// Applies a signed stock delta.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::InsufficientStock` if stock would go negative.
    pub fn adjust_stock(&mut self, stand_id: i64, delta: i64) -> Result<(), PersistenceError> {
        mutations::inventory::adjust_stock(self.conn, stand_id, delta)
    }

    // ========================================================================
    // Kermesses
    // ========================================================================

    /// Retrieves a kermesse by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_kermesse(&mut self, kermesse_id: i64) -> Result<Option<Kermesse>, PersistenceError> {
        queries::kermesses::get_kermesse(self.conn, kermesse_id)
    }

    /// Lists kermesses visible under `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_kermesses(
        &mut self,
        filter: &KermesseFilter,
    ) -> Result<Vec<Kermesse>, PersistenceError> {
        queries::kermesses::list_kermesses(self.conn, filter)
    }

    /// Returns true if the user is linked to the kermesse.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn is_user_linked(
        &mut self,
        kermesse_id: i64,
        user_id: i64,
    ) -> Result<bool, PersistenceError> {
        queries::kermesses::is_user_linked(self.conn, kermesse_id, user_id)
    }

    /// Lists every kermesse the stand is linked to.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn kermesses_for_stand(
        &mut self,
        stand_id: i64,
    ) -> Result<Vec<Kermesse>, PersistenceError> {
        queries::kermesses::kermesses_for_stand(self.conn, stand_id)
    }

    /// Returns the running kermesse the stand is linked to.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn running_kermesse_for_stand(
        &mut self,
        stand_id: i64,
    ) -> Result<Option<Kermesse>, PersistenceError> {
        queries::kermesses::running_kermesse_for_stand(self.conn, stand_id)
    }

    /// Lists students not linked to the kermesse.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn users_for_invitation(
        &mut self,
        kermesse_id: i64,
    ) -> Result<Vec<User>, PersistenceError> {
        queries::kermesses::users_for_invitation(self.conn, kermesse_id)
    }

    /// Computes kermesse statistics for `scope`.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn kermesse_statistics(
        &mut self,
        kermesse_id: i64,
        scope: ActorScope,
    ) -> Result<KermesseStatistics, PersistenceError> {
        queries::statistics::kermesse_statistics(self.conn, kermesse_id, scope)
    }

    /// Creates a kermesse.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_kermesse(
        &mut self,
        organizer_id: i64,
        name: &str,
        description: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::kermesses::create_kermesse(self.conn, organizer_id, name, description)
    }

    /// Updates a running kermesse.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::AlreadyFinished` if it is finished.
    pub fn update_kermesse(
        &mut self,
        kermesse_id: i64,
        name: &str,
        description: &str,
    ) -> Result<(), PersistenceError> {
        mutations::kermesses::update_kermesse(self.conn, kermesse_id, name, description)
    }

    /// Finishes a running kermesse.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::AlreadyFinished` if it is finished.
    pub fn finish_kermesse(&mut self, kermesse_id: i64) -> Result<(), PersistenceError> {
        mutations::kermesses::finish_kermesse(self.conn, kermesse_id)
    }

    /// Links a user to a kermesse.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Duplicate` if already linked.
    pub fn link_user(&mut self, kermesse_id: i64, user_id: i64) -> Result<(), PersistenceError> {
        mutations::kermesses::link_user(self.conn, kermesse_id, user_id)
    }

    /// Links a user to a kermesse unless already linked.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn link_user_if_absent(
        &mut self,
        kermesse_id: i64,
        user_id: i64,
    ) -> Result<bool, PersistenceError> {
        mutations::kermesses::link_user_if_absent(self.conn, kermesse_id, user_id)
    }

    /// Links a stand to a kermesse.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Duplicate` if already linked.
    pub fn link_stand(&mut self, kermesse_id: i64, stand_id: i64) -> Result<(), PersistenceError> {
        mutations::kermesses::link_stand(self.conn, kermesse_id, stand_id)
    }

    // ========================================================================
    // Stands
    // ========================================================================

    /// Retrieves a stand by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_stand(&mut self, stand_id: i64) -> Result<Option<Stand>, PersistenceError> {
        queries::stands::get_stand(self.conn, stand_id)
    }

    /// Retrieves the stand owned by a holder.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_stand_by_holder(
        &mut self,
        holder_id: i64,
    ) -> Result<Option<Stand>, PersistenceError> {
        queries::stands::get_stand_by_holder(self.conn, holder_id)
    }

    /// Lists stands matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_stands(&mut self, filter: &StandFilter) -> Result<Vec<Stand>, PersistenceError> {
        queries::stands::list_stands(self.conn, filter)
    }

    /// Creates a stand.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Duplicate` if the holder already owns one.
    pub fn create_stand(&mut self, new_stand: &NewStand<'_>) -> Result<i64, PersistenceError> {
        mutations::stands::create_stand(self.conn, new_stand)
    }

    /// Updates a stand's descriptive fields and price.
    ///
    /// # Errors
    ///
    /// Returns an error if the stand does not exist.
    pub fn update_stand(
        &mut self,
        stand_id: i64,
        name: &str,
        description: &str,
        price: u64,
    ) -> Result<(), PersistenceError> {
        mutations::stands::update_stand(self.conn, stand_id, name, description, price)
    }

    // ========================================================================
    // Participations
    // ========================================================================

    /// Retrieves a participation by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_participation(
        &mut self,
        participation_id: i64,
    ) -> Result<Option<Participation>, PersistenceError> {
        queries::participations::get_participation(self.conn, participation_id)
    }

    /// Lists participations visible under `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_participations(
        &mut self,
        filter: &ParticipationFilter,
    ) -> Result<Vec<Participation>, PersistenceError> {
        queries::participations::list_participations(self.conn, filter)
    }

    /// Inserts a participation.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_participation(
        &mut self,
        new: &NewParticipation,
    ) -> Result<i64, PersistenceError> {
        mutations::participations::insert_participation(self.conn, new)
    }

    /// Records a game outcome.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::AlreadyFinished` if already recorded.
    pub fn record_outcome(
        &mut self,
        participation_id: i64,
        points: u32,
    ) -> Result<(), PersistenceError> {
        mutations::participations::record_outcome(self.conn, participation_id, points)
    }

    // ========================================================================
    // Tombolas & Tickets
    // ========================================================================

    /// Retrieves a tombola by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_tombola(&mut self, tombola_id: i64) -> Result<Option<Tombola>, PersistenceError> {
        queries::tombolas::get_tombola(self.conn, tombola_id)
    }

    /// Lists tombolas matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_tombolas(
        &mut self,
        filter: &TombolaFilter,
    ) -> Result<Vec<Tombola>, PersistenceError> {
        queries::tombolas::list_tombolas(self.conn, filter)
    }

    /// Creates a tombola.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_tombola(&mut self, new: &NewTombola<'_>) -> Result<i64, PersistenceError> {
        mutations::tombolas::create_tombola(self.conn, new)
    }

    /// Updates a running tombola.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::AlreadyFinished` if it is finished.
    pub fn update_tombola(
        &mut self,
        tombola_id: i64,
        name: &str,
        prize: &str,
        price: u64,
    ) -> Result<(), PersistenceError> {
        mutations::tombolas::update_tombola(self.conn, tombola_id, name, prize, price)
    }

    /// Finishes a running tombola.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::AlreadyFinished` if it is finished.
    pub fn finish_tombola(&mut self, tombola_id: i64) -> Result<(), PersistenceError> {
        mutations::tombolas::finish_tombola(self.conn, tombola_id)
    }

    /// Retrieves a ticket by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_ticket(&mut self, ticket_id: i64) -> Result<Option<Ticket>, PersistenceError> {
        queries::tickets::get_ticket(self.conn, ticket_id)
    }

    /// Lists tickets visible under `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_tickets(&mut self, filter: &TicketFilter) -> Result<Vec<Ticket>, PersistenceError> {
        queries::tickets::list_tickets(self.conn, filter)
    }

    /// Lists ticket ids of a tombola in sale order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn ticket_ids_for_tombola(
        &mut self,
        tombola_id: i64,
    ) -> Result<Vec<i64>, PersistenceError> {
        queries::tickets::ticket_ids_for_tombola(self.conn, tombola_id)
    }

    /// Counts winning tickets of a tombola.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_winners(&mut self, tombola_id: i64) -> Result<i64, PersistenceError> {
        queries::tickets::count_winners(self.conn, tombola_id)
    }

    /// Inserts a non-winning ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_ticket(
        &mut self,
        tombola_id: i64,
        user_id: i64,
    ) -> Result<i64, PersistenceError> {
        mutations::tickets::insert_ticket(self.conn, tombola_id, user_id)
    }

    /// Flags a ticket as the tombola winner.
    ///
    /// # Errors
    ///
    /// Returns an error if the ticket cannot be flagged.
    pub fn mark_winner(&mut self, tombola_id: i64, ticket_id: i64) -> Result<(), PersistenceError> {
        mutations::tickets::mark_winner(self.conn, tombola_id, ticket_id)
    }
}
