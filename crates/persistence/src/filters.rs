// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Typed list filters.
//!
//! Each filter is translated field by field into Diesel predicates with
//! bound parameters. No filter value is ever formatted into SQL text.

/// Which rows a listing actor may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorScope {
    /// No restriction.
    All,
    /// Rows belonging to kermesses this organizer owns.
    Organizer(i64),
    /// Rows tied to this stand holder's stand.
    StandHolder(i64),
    /// Rows belonging to this student.
    Student(i64),
    /// Rows belonging to this parent or their children.
    Parent(i64),
}

/// Filter for kermesse listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KermesseFilter {
    pub scope: ActorScope,
}

/// Filter for stand listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandFilter {
    /// Only stands linked to this kermesse.
    pub kermesse_id: Option<i64>,
    /// Only stands not linked to any running kermesse.
    pub ready_only: bool,
}

/// Filter for participation listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticipationFilter {
    pub scope: ActorScope,
    pub kermesse_id: Option<i64>,
}

/// Filter for tombola listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TombolaFilter {
    pub kermesse_id: Option<i64>,
}

/// Filter for ticket listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketFilter {
    pub scope: ActorScope,
    pub tombola_id: Option<i64>,
}
