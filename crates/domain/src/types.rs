// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::lifecycle::LifecycleStatus;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Role of a user in the kermesse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Parent of one or more students. Funds their children.
    Parent,
    /// Student. Buys at stands and buys tombola tickets.
    Student,
    /// Creates and runs kermesses and their tombolas.
    Organizer,
    /// Owns a stand and records game outcomes.
    StandHolder,
}

impl UserRole {
    /// Returns the string representation used for persistence and serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Parent => "PARENT",
            Self::Student => "STUDENT",
            Self::Organizer => "ORGANIZER",
            Self::StandHolder => "STAND_HOLDER",
        }
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PARENT" => Ok(Self::Parent),
            "STUDENT" => Ok(Self::Student),
            "ORGANIZER" => Ok(Self::Organizer),
            "STAND_HOLDER" => Ok(Self::StandHolder),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of goods or activity offered by a stand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StandCategory {
    /// Consumable food. Stock-tracked.
    Food,
    /// Consumable drinks. Stock-tracked.
    Drink,
    /// Game. Unlimited, awards points.
    Game,
}

impl StandCategory {
    /// Returns the string representation used for persistence and serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "FOOD",
            Self::Drink => "DRINK",
            Self::Game => "GAME",
        }
    }

    /// Returns true if purchases at stands of this category consume stock.
    #[must_use]
    pub const fn tracks_stock(&self) -> bool {
        matches!(self, Self::Food | Self::Drink)
    }

    /// Returns true if participations in this category await an outcome.
    #[must_use]
    pub const fn records_outcome(&self) -> bool {
        matches!(self, Self::Game)
    }
}

impl FromStr for StandCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FOOD" => Ok(Self::Food),
            "DRINK" => Ok(Self::Drink),
            "GAME" => Ok(Self::Game),
            _ => Err(DomainError::InvalidCategory(s.to_string())),
        }
    }
}

impl std::fmt::Display for StandCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered user.
///
/// The balance is only ever changed through ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Canonical identifier.
    pub user_id: i64,
    /// Owning parent, for students invited by a parent.
    pub parent_id: Option<i64>,
    /// Display name.
    pub name: String,
    /// Unique login email.
    pub email: String,
    /// Role.
    pub role: UserRole,
    /// Spendable balance in tokens.
    pub balance: u64,
}

impl User {
    /// Returns true if `parent_id` is this user's parent.
    #[must_use]
    pub fn is_child_of(&self, parent_id: i64) -> bool {
        self.parent_id == Some(parent_id)
    }
}

/// A school fair event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kermesse {
    /// Canonical identifier.
    pub kermesse_id: i64,
    /// Organizer who created and owns the kermesse.
    pub organizer_id: i64,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Lifecycle status.
    pub status: LifecycleStatus,
}

/// A stand run by a stand holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stand {
    /// Canonical identifier.
    pub stand_id: i64,
    /// Stand holder who owns the stand.
    pub holder_id: i64,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Category.
    pub category: StandCategory,
    /// Price per unit.
    pub price: u64,
    /// Remaining units. Always zero for categories that do not track stock.
    pub stock: u64,
}

/// A recorded purchase or play at a stand.
///
/// Category, quantity and balance are snapshots taken at purchase time
/// and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participation {
    /// Canonical identifier.
    pub participation_id: i64,
    /// Kermesse the stand was linked to at purchase time.
    pub kermesse_id: i64,
    /// Stand the purchase was made at.
    pub stand_id: i64,
    /// Buyer.
    pub user_id: i64,
    /// Stand category at purchase time.
    pub category: StandCategory,
    /// Units bought.
    pub quantity: u32,
    /// Total amount charged.
    pub balance: u64,
    /// Points earned. Only meaningful for games.
    pub points: u32,
    /// Outcome status.
    pub status: LifecycleStatus,
}

/// A raffle run under a kermesse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tombola {
    /// Canonical identifier.
    pub tombola_id: i64,
    /// Owning kermesse.
    pub kermesse_id: i64,
    /// Display name.
    pub name: String,
    /// Prize description.
    pub prize: String,
    /// Price per ticket.
    pub price: u64,
    /// Lifecycle status.
    pub status: LifecycleStatus,
}

/// A tombola ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Canonical identifier.
    pub ticket_id: i64,
    /// Buyer.
    pub user_id: i64,
    /// Tombola the ticket belongs to.
    pub tombola_id: i64,
    /// Set exactly once, on the single drawn ticket.
    pub is_winner: bool,
}

/// Aggregated figures for a kermesse, scoped to the requesting actor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KermesseStatistics {
    /// Linked users visible to the actor.
    pub user_count: u64,
    /// Linked stands.
    pub stand_count: u64,
    /// Tombolas run under the kermesse.
    pub tombola_count: u64,
    /// Ticket revenue across all tombolas; zero outside the organizer's view.
    pub tombola_revenue: u64,
    /// Participations visible to the actor.
    pub participation_count: u64,
    /// Revenue of the participations visible to the actor.
    pub participation_revenue: u64,
    /// Points earned by the actor.
    pub points: u64,
}
