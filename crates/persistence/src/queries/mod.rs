// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! Every function takes a plain `&mut SqliteConnection`; callers that need
//! a consistent view across several reads run them inside a transaction.
//!
//! Lookups by id return `Ok(None)` for missing rows and leave the
//! not-found decision to the caller.

pub mod kermesses;
pub mod participations;
pub mod stands;
pub mod statistics;
pub mod tickets;
pub mod tombolas;
pub mod users;
