// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `SQLite` connection setup.
//!
//! Opening a store connection always applies the same sequence: writer
//! wait time, foreign keys, journal mode (files only), migrations, then a
//! read-back of the pragmas the ledger depends on.

use diesel::sql_types::{Integer, Text};
use diesel::{Connection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

use crate::error::PersistenceError;

/// Kermesse schema migrations, embedded at compile time.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// How long a writer waits on `BEGIN IMMEDIATE` before `SQLITE_BUSY`.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Where the store lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// Shared-cache in-memory database, private to one `Persistence`.
    Memory,
    /// On-disk database that several connections may share.
    File,
}

impl Storage {
    /// Journal mode applied to the connection, if any.
    const fn journal_mode(self) -> Option<&'static str> {
        match self {
            Self::Memory => None,
            Self::File => Some("WAL"),
        }
    }
}

#[derive(QueryableByName)]
struct ForeignKeysPragma {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

#[derive(QueryableByName)]
struct JournalModePragma {
    #[diesel(sql_type = Text)]
    journal_mode: String,
}

fn pragma(conn: &mut SqliteConnection, statement: &str) -> Result<(), PersistenceError> {
    // Diesel has no PRAGMA DSL.
    diesel::sql_query(statement)
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("{statement}: {e}")))?;
    Ok(())
}

/// Opens a connection to `database_url`, configures it for `storage` and
/// brings the schema up to date.
///
/// # Errors
///
/// Returns an error if:
/// - The connection cannot be established
/// - A pragma cannot be applied
/// - A migration fails
/// - Foreign key enforcement is off after setup
pub fn open_connection(
    database_url: &str,
    storage: Storage,
) -> Result<SqliteConnection, PersistenceError> {
    info!(database_url, ?storage, "Opening kermesse store");

    let mut conn: SqliteConnection = SqliteConnection::establish(database_url)?;

    pragma(&mut conn, &format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"))?;
    pragma(&mut conn, "PRAGMA foreign_keys = ON")?;

    if let Some(mode) = storage.journal_mode() {
        let applied: String = diesel::sql_query(format!("PRAGMA journal_mode = {mode}"))
            .get_result::<JournalModePragma>(&mut conn)?
            .journal_mode;
        debug!(requested = mode, applied, "Journal mode set");
    }

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;
    debug!(count = applied.len(), "Migrations applied");

    verify_foreign_key_enforcement(&mut conn)?;
    Ok(conn)
}

/// Checks that `SQLite` enforces foreign keys on this connection.
///
/// The pragma is per connection, so a connection that skipped setup would
/// silently accept links to users or kermesses that do not exist.
///
/// # Errors
///
/// Returns `PersistenceError::ForeignKeyEnforcementNotEnabled` if it is off.
pub fn verify_foreign_key_enforcement(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    let enabled: i32 = diesel::sql_query("PRAGMA foreign_keys")
        .get_result::<ForeignKeysPragma>(conn)?
        .foreign_keys;

    if enabled == 0 {
        return Err(PersistenceError::ForeignKeyEnforcementNotEnabled);
    }
    Ok(())
}
