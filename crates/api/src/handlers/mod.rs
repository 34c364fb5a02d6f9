// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Orchestrators.
//!
//! Each public function is one command: it authorizes the actor, opens a
//! single store transaction, runs the eligibility checks against freshly
//! read rows, applies its writes, and only then notifies.

pub mod kermesses;
pub mod participations;
pub mod stands;
pub mod tombolas;
pub mod users;

use crate::error::ApiError;

/// Turns a missing row into `ResourceNotFound`.
pub(crate) fn require_found<T>(
    found: Option<T>,
    resource_type: &str,
    id: i64,
) -> Result<T, ApiError> {
    found.ok_or_else(|| ApiError::not_found(resource_type, id))
}
