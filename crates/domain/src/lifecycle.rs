// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Lifecycle state shared by kermesses, tombolas and game participations.
//!
//! The machine has a single edge: `STARTED` to `FINISHED`. `FINISHED`
//! is terminal and there is no way back.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle status of a kermesse, tombola or participation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleStatus {
    /// Open for mutation. Initial state.
    Started,
    /// Closed. Terminal state.
    Finished,
}

impl LifecycleStatus {
    /// Returns the string representation used for persistence and serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "STARTED",
            Self::Finished => "FINISHED",
        }
    }

    /// Returns true if no transition can leave this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Returns true if `self -> target` is an edge of the machine.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Started, Self::Finished))
    }

    /// Validates a transition from this status to `target`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` if the edge does not exist.
    pub fn validate_transition(&self, target: Self) -> Result<(), DomainError> {
        if self.can_transition_to(target) {
            return Ok(());
        }

        let reason: &str = if self.is_terminal() {
            "cannot transition from terminal state"
        } else {
            "transition not permitted by lifecycle rules"
        };

        Err(DomainError::InvalidStatusTransition {
            from: self.as_str().to_string(),
            to: target.as_str().to_string(),
            reason: reason.to_string(),
        })
    }
}

impl FromStr for LifecycleStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STARTED" => Ok(Self::Started),
            "FINISHED" => Ok(Self::Finished),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
