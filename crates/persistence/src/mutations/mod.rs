// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! ## Module Organization
//!
//! - `ledger`: balance credit/debit and external top-ups
//! - `inventory`: stand stock adjustments
//! - `kermesses`: kermesse rows, status and links
//! - `participations`, `stands`, `tickets`, `tombolas`, `users`: entity rows
//!
//! Ledger, inventory and status changes are single conditional `UPDATE`
//! statements. The condition is the invariant; zero affected rows means
//! the invariant would have been broken and the change did not happen.

pub mod inventory;
pub mod kermesses;
pub mod ledger;
pub mod participations;
pub mod stands;
pub mod tickets;
pub mod tombolas;
pub mod users;
