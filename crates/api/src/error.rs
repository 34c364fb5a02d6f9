// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use crate::password_policy::PasswordPolicyError;
use kermesse_domain::{DomainError, Ineligibility, IneligibilityKind};
use kermesse_persistence::PersistenceError;

/// Transport-independent classification of an [`ApiError`].
///
/// The boundary layer maps each kind to its own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced entity does not exist.
    NotFound,
    /// Malformed input or a state that does not allow the mutation.
    BadRequest,
    /// The actor lacks the required relationship to the target.
    Forbidden,
    /// No valid actor context.
    Unauthorized,
    /// A concurrent mutation raced and lost.
    Conflict,
    /// Storage or invariant failure not caused by the caller.
    Internal,
}

impl ErrorKind {
    /// Returns the wire name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::Forbidden => "forbidden",
            Self::Unauthorized => "unauthorized",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// API-level errors.
///
/// These are distinct from domain and persistence errors and represent the
/// API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No valid actor context, or credentials did not match.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The actor lacks the relationship or role the action requires.
    Forbidden {
        /// The rule that refused the actor.
        rule: String,
        /// A human-readable description of the refusal.
        message: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// A concurrent or repeated mutation lost against committed state.
    Conflict {
        /// The type of resource that conflicted.
        resource_type: String,
        /// A human-readable description of the conflict.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
    /// Password policy violation.
    PasswordPolicyViolation {
        /// A human-readable description of the policy violation.
        message: String,
    },
}

impl ApiError {
    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthenticationFailed { .. } => ErrorKind::Unauthorized,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::DomainRuleViolation { .. }
            | Self::InvalidInput { .. }
            | Self::PasswordPolicyViolation { .. } => ErrorKind::BadRequest,
            Self::ResourceNotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub(crate) fn not_found(resource_type: &str, id: i64) -> Self {
        Self::ResourceNotFound {
            resource_type: resource_type.to_string(),
            message: format!("{resource_type} {id} does not exist"),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Forbidden { rule, message } => write!(f, "Forbidden ({rule}): {message}"),
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict {
                resource_type,
                message,
            } => write!(f, "{resource_type} conflict: {message}"),
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
            Self::PasswordPolicyViolation { message } => {
                write!(f, "Password policy violation: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::PasswordPolicyViolation {
            message: err.to_string(),
        }
    }
}

impl From<Ineligibility> for ApiError {
    fn from(err: Ineligibility) -> Self {
        translate_ineligibility(&err)
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        translate_persistence_error(err)
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidName { field, reason } => ApiError::InvalidInput {
            field: field.to_string(),
            message: reason,
        },
        DomainError::InvalidEmail(email) => ApiError::InvalidInput {
            field: String::from("email"),
            message: format!("'{email}' is not a valid email address"),
        },
        DomainError::InvalidRole(role) => ApiError::InvalidInput {
            field: String::from("role"),
            message: format!("Unknown role '{role}'"),
        },
        DomainError::InvalidCategory(category) => ApiError::InvalidInput {
            field: String::from("category"),
            message: format!("Unknown stand category '{category}'"),
        },
        DomainError::InvalidStatus(status) => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("Unknown status '{status}'"),
        },
        DomainError::InvalidAmount { field, reason } => ApiError::InvalidInput {
            field: field.to_string(),
            message: reason,
        },
        DomainError::InvalidQuantity { category, reason } => ApiError::InvalidInput {
            field: String::from("quantity"),
            message: format!("{reason} for a {category} stand"),
        },
        DomainError::InvalidPoints(reason) => ApiError::InvalidInput {
            field: String::from("points"),
            message: reason,
        },
        DomainError::PriceOverflow {
            unit_price,
            quantity,
        } => ApiError::DomainRuleViolation {
            rule: String::from("price_overflow"),
            message: format!("{quantity} x {unit_price} exceeds the maximum balance"),
        },
        DomainError::InvalidStatusTransition { from, to, reason } => {
            ApiError::DomainRuleViolation {
                rule: String::from("status_transition"),
                message: format!("Cannot move from {from} to {to}: {reason}"),
            }
        }
    }
}

/// Translates an eligibility rejection into an API error.
///
/// Relationship failures become `Forbidden`, state failures become
/// domain rule violations.
#[must_use]
pub fn translate_ineligibility(err: &Ineligibility) -> ApiError {
    match err.kind() {
        IneligibilityKind::Forbidden => ApiError::Forbidden {
            rule: err.rule().to_string(),
            message: err.to_string(),
        },
        IneligibilityKind::BadRequest => ApiError::DomainRuleViolation {
            rule: err.rule().to_string(),
            message: err.to_string(),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Conditional-update losses surface as `Conflict`: the eligibility
/// checks passed but committed state no longer allowed the write.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(what) => ApiError::ResourceNotFound {
            resource_type: String::from("Resource"),
            message: what,
        },
        PersistenceError::InsufficientBalance { .. } => ApiError::Conflict {
            resource_type: String::from("Balance"),
            message: err.to_string(),
        },
        PersistenceError::InsufficientStock { .. } => ApiError::Conflict {
            resource_type: String::from("Stock"),
            message: err.to_string(),
        },
        PersistenceError::AlreadyFinished { resource, .. } => ApiError::Conflict {
            resource_type: resource.to_string(),
            message: err.to_string(),
        },
        PersistenceError::WinnerNotRecorded { .. } => ApiError::Conflict {
            resource_type: String::from("Ticket"),
            message: err.to_string(),
        },
        PersistenceError::Duplicate(what) => ApiError::Conflict {
            resource_type: String::from("Resource"),
            message: format!("Already exists: {what}"),
        },
        PersistenceError::BalanceOverflow { .. } | PersistenceError::StockOverflow { .. } => {
            ApiError::DomainRuleViolation {
                rule: String::from("storage_range"),
                message: err.to_string(),
            }
        }
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
