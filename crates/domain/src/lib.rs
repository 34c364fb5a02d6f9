// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Domain types and business rules for the kermesse engine.
//!
//! Nothing in this crate performs I/O. Entities are plain data,
//! eligibility rules are pure predicates over already-fetched entities,
//! and the winner draw only consumes a caller-visible random source.

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

mod draw;
mod eligibility;
mod error;
mod lifecycle;
mod purchase;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use draw::pick_winner;
pub use eligibility::{
    Ineligibility, IneligibilityKind, can_buy_at_stand, can_buy_ticket, can_complete_kermesse,
    can_finish_tombola, can_link_stand, can_link_user, can_modify_stand_stock,
    can_modify_tombola, can_mutate_under_kermesse, can_record_outcome, require_balance,
    require_owner, require_role,
};
pub use error::DomainError;
pub use lifecycle::LifecycleStatus;
pub use purchase::{PurchaseQuote, quote_purchase, resolve_quantity};
pub use types::{
    Kermesse, KermesseStatistics, Participation, Stand, StandCategory, Ticket, Tombola, User,
    UserRole,
};
pub use validation::{
    validate_amount, validate_email, validate_kermesse_fields, validate_name, validate_points,
    validate_stand_fields, validate_tombola_fields,
};
