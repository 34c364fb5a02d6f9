// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::result::DatabaseErrorKind;

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// The requested resource was not found.
    NotFound(String),
    /// A uniqueness constraint rejected the write.
    Duplicate(String),
    /// A stored row could not be mapped back to a domain value.
    CorruptRow(String),
    /// A conditional debit found the balance too low.
    InsufficientBalance { user_id: i64, amount: u64 },
    /// A credit would exceed the storable balance.
    BalanceOverflow { user_id: i64, amount: u64 },
    /// A conditional stock decrement found too few units.
    InsufficientStock { stand_id: i64, requested: u64 },
    /// A stock increment would exceed the storable range.
    StockOverflow { stand_id: i64, amount: u64 },
    /// A conditional status flip found the resource already finished.
    AlreadyFinished { resource: &'static str, id: i64 },
    /// The ticket could not be marked as the winner.
    WinnerNotRecorded { tombola_id: i64, ticket_id: i64 },
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::Duplicate(msg) => write!(f, "Duplicate: {msg}"),
            Self::CorruptRow(msg) => write!(f, "Corrupt row: {msg}"),
            Self::InsufficientBalance { user_id, amount } => {
                write!(f, "Balance of user {user_id} does not cover {amount}")
            }
            Self::BalanceOverflow { user_id, amount } => {
                write!(f, "Crediting {amount} to user {user_id} overflows the balance")
            }
            Self::InsufficientStock {
                stand_id,
                requested,
            } => write!(f, "Stand {stand_id} does not hold {requested} unit(s)"),
            Self::StockOverflow { stand_id, amount } => {
                write!(f, "Adding {amount} unit(s) to stand {stand_id} overflows the stock")
            }
            Self::AlreadyFinished { resource, id } => {
                write!(f, "{resource} {id} is already finished")
            }
            Self::WinnerNotRecorded {
                tombola_id,
                ticket_id,
            } => write!(
                f,
                "Ticket {ticket_id} could not be marked as winner of tombola {tombola_id}"
            ),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::Duplicate(info.message().to_string())
            }
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}
