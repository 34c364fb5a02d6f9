// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A name field is empty or invalid.
    InvalidName {
        /// The field that failed validation.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// Email address is malformed.
    InvalidEmail(String),
    /// Role string is not a known role.
    InvalidRole(String),
    /// Stand category string is not a known category.
    InvalidCategory(String),
    /// Lifecycle status string is not a known status.
    InvalidStatus(String),
    /// Monetary amount is invalid for the operation.
    InvalidAmount {
        /// The field that carried the amount.
        field: &'static str,
        /// Why the amount was rejected.
        reason: String,
    },
    /// Requested quantity is invalid for the stand.
    InvalidQuantity {
        /// The stand category the quantity was requested against.
        category: String,
        /// Why the quantity was rejected.
        reason: String,
    },
    /// Points value is invalid.
    InvalidPoints(String),
    /// Price times quantity does not fit in a balance.
    PriceOverflow {
        /// The unit price.
        unit_price: u64,
        /// The requested quantity.
        quantity: u32,
    },
    /// Status transition is not permitted.
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// Reason why the transition is not allowed.
        reason: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName { field, reason } => write!(f, "Invalid {field}: {reason}"),
            Self::InvalidEmail(email) => write!(f, "Invalid email address: '{email}'"),
            Self::InvalidRole(role) => write!(f, "Invalid role: '{role}'"),
            Self::InvalidCategory(category) => write!(f, "Invalid stand category: '{category}'"),
            Self::InvalidStatus(status) => write!(f, "Invalid status: '{status}'"),
            Self::InvalidAmount { field, reason } => write!(f, "Invalid {field}: {reason}"),
            Self::InvalidQuantity { category, reason } => {
                write!(f, "Invalid quantity for {category} stand: {reason}")
            }
            Self::InvalidPoints(msg) => write!(f, "Invalid points: {msg}"),
            Self::PriceOverflow {
                unit_price,
                quantity,
            } => write!(
                f,
                "Total price overflows: {quantity} x {unit_price} exceeds the maximum balance"
            ),
            Self::InvalidStatusTransition { from, to, reason } => {
                write!(f, "Invalid status transition from {from} to {to}: {reason}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
