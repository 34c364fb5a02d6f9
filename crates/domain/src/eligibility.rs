// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Eligibility rules.
//!
//! Every predicate here is pure and operates on entities the caller has
//! already fetched. A rejection is returned as a typed [`Ineligibility`]
//! so the caller can tell an actor-relationship failure (forbidden)
//! from a state or sufficiency failure (bad request).

use crate::lifecycle::LifecycleStatus;
use crate::types::{Kermesse, Participation, Stand, Tombola, User, UserRole};

/// Classification of a rejected predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IneligibilityKind {
    /// The actor lacks the required relationship to the target.
    Forbidden,
    /// The target is in a state that does not allow the action.
    BadRequest,
}

/// Why an actor may not perform an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ineligibility {
    /// The actor does not own the resource.
    NotOwner {
        /// Kind of resource.
        resource: &'static str,
        /// Resource identifier.
        resource_id: i64,
        /// The acting user.
        actor_id: i64,
    },
    /// The actor's role may not perform the action.
    RoleNotPermitted {
        /// The action attempted.
        action: &'static str,
        /// The actor's role.
        role: UserRole,
    },
    /// The user is not linked to the kermesse.
    NotEnrolled {
        /// The user.
        user_id: i64,
        /// The kermesse.
        kermesse_id: i64,
    },
    /// The stand is not linked to any running kermesse.
    StandNotOpen {
        /// The stand.
        stand_id: i64,
    },
    /// The kermesse is no longer running, so nothing can be bought under it.
    KermesseNotStarted {
        /// The kermesse.
        kermesse_id: i64,
    },
    /// The kermesse is finished and refuses mutation.
    KermesseFinished {
        /// The kermesse.
        kermesse_id: i64,
    },
    /// The tombola is finished.
    TombolaFinished {
        /// The tombola.
        tombola_id: i64,
    },
    /// The kermesse still has running tombolas.
    TombolasStillRunning {
        /// The kermesse.
        kermesse_id: i64,
        /// How many tombolas are still running.
        running: usize,
    },
    /// The tombola has no tickets to draw from.
    NoTicketsSold {
        /// The tombola.
        tombola_id: i64,
    },
    /// The stand is already linked to a running kermesse.
    StandAlreadyLinked {
        /// The stand.
        stand_id: i64,
        /// The running kermesse it is linked to.
        kermesse_id: i64,
    },
    /// Only students can be linked to a kermesse directly.
    NotAStudent {
        /// The target user.
        user_id: i64,
    },
    /// The user is already linked to the kermesse.
    AlreadyLinked {
        /// The user.
        user_id: i64,
        /// The kermesse.
        kermesse_id: i64,
    },
    /// The stand does not hold enough stock.
    InsufficientStock {
        /// The stand.
        stand_id: i64,
        /// Units available.
        available: u64,
        /// Units requested.
        requested: u64,
    },
    /// The user's balance does not cover the amount.
    InsufficientBalance {
        /// The user.
        user_id: i64,
        /// Current balance.
        available: u64,
        /// Amount required.
        required: u64,
    },
    /// The participation is not a game and has no outcome.
    NotAGame {
        /// The participation.
        participation_id: i64,
    },
    /// The participation outcome was already recorded.
    OutcomeAlreadyRecorded {
        /// The participation.
        participation_id: i64,
    },
}

impl Ineligibility {
    /// Returns whether the rejection is a relationship or a state failure.
    #[must_use]
    pub const fn kind(&self) -> IneligibilityKind {
        match self {
            Self::NotOwner { .. }
            | Self::RoleNotPermitted { .. }
            | Self::NotEnrolled { .. }
            | Self::StandNotOpen { .. }
            | Self::KermesseNotStarted { .. } => IneligibilityKind::Forbidden,
            Self::KermesseFinished { .. }
            | Self::TombolaFinished { .. }
            | Self::TombolasStillRunning { .. }
            | Self::NoTicketsSold { .. }
            | Self::StandAlreadyLinked { .. }
            | Self::NotAStudent { .. }
            | Self::AlreadyLinked { .. }
            | Self::InsufficientStock { .. }
            | Self::InsufficientBalance { .. }
            | Self::NotAGame { .. }
            | Self::OutcomeAlreadyRecorded { .. } => IneligibilityKind::BadRequest,
        }
    }

    /// Returns a stable machine-readable name for the violated rule.
    #[must_use]
    pub const fn rule(&self) -> &'static str {
        match self {
            Self::NotOwner { .. } => "not_owner",
            Self::RoleNotPermitted { .. } => "role_not_permitted",
            Self::NotEnrolled { .. } => "not_enrolled",
            Self::StandNotOpen { .. } => "stand_not_open",
            Self::KermesseNotStarted { .. } => "kermesse_not_started",
            Self::KermesseFinished { .. } => "kermesse_finished",
            Self::TombolaFinished { .. } => "tombola_finished",
            Self::TombolasStillRunning { .. } => "tombolas_still_running",
            Self::NoTicketsSold { .. } => "no_tickets_sold",
            Self::StandAlreadyLinked { .. } => "stand_already_linked",
            Self::NotAStudent { .. } => "not_a_student",
            Self::AlreadyLinked { .. } => "already_linked",
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::NotAGame { .. } => "not_a_game",
            Self::OutcomeAlreadyRecorded { .. } => "outcome_already_recorded",
        }
    }
}

impl std::fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOwner {
                resource,
                resource_id,
                actor_id,
            } => write!(f, "User {actor_id} does not own {resource} {resource_id}"),
            Self::RoleNotPermitted { action, role } => {
                write!(f, "Role {role} may not {action}")
            }
            Self::NotEnrolled {
                user_id,
                kermesse_id,
            } => write!(f, "User {user_id} is not enrolled in kermesse {kermesse_id}"),
            Self::StandNotOpen { stand_id } => {
                write!(f, "Stand {stand_id} is not linked to a running kermesse")
            }
            Self::KermesseNotStarted { kermesse_id } => {
                write!(f, "Kermesse {kermesse_id} is not running")
            }
            Self::KermesseFinished { kermesse_id } => {
                write!(f, "Kermesse {kermesse_id} is finished")
            }
            Self::TombolaFinished { tombola_id } => write!(f, "Tombola {tombola_id} is finished"),
            Self::TombolasStillRunning {
                kermesse_id,
                running,
            } => write!(
                f,
                "Kermesse {kermesse_id} still has {running} running tombola(s)"
            ),
            Self::NoTicketsSold { tombola_id } => {
                write!(f, "Tombola {tombola_id} has no tickets to draw from")
            }
            Self::StandAlreadyLinked {
                stand_id,
                kermesse_id,
            } => write!(
                f,
                "Stand {stand_id} is already linked to running kermesse {kermesse_id}"
            ),
            Self::NotAStudent { user_id } => write!(f, "User {user_id} is not a student"),
            Self::AlreadyLinked {
                user_id,
                kermesse_id,
            } => write!(
                f,
                "User {user_id} is already linked to kermesse {kermesse_id}"
            ),
            Self::InsufficientStock {
                stand_id,
                available,
                requested,
            } => write!(
                f,
                "Stand {stand_id} has {available} unit(s) left, {requested} requested"
            ),
            Self::InsufficientBalance {
                user_id,
                available,
                required,
            } => write!(
                f,
                "User {user_id} has a balance of {available}, {required} required"
            ),
            Self::NotAGame { participation_id } => {
                write!(f, "Participation {participation_id} is not a game")
            }
            Self::OutcomeAlreadyRecorded { participation_id } => write!(
                f,
                "Participation {participation_id} already has a recorded outcome"
            ),
        }
    }
}

impl std::error::Error for Ineligibility {}

/// Requires `actor_id` to be the owner of a resource.
///
/// # Errors
///
/// Returns `Ineligibility::NotOwner` if the ids differ.
pub const fn require_owner(
    resource: &'static str,
    resource_id: i64,
    owner_id: i64,
    actor_id: i64,
) -> Result<(), Ineligibility> {
    if owner_id == actor_id {
        Ok(())
    } else {
        Err(Ineligibility::NotOwner {
            resource,
            resource_id,
            actor_id,
        })
    }
}

/// Requires `role` to be one of `allowed`.
///
/// # Errors
///
/// Returns `Ineligibility::RoleNotPermitted` otherwise.
pub fn require_role(
    action: &'static str,
    role: UserRole,
    allowed: &[UserRole],
) -> Result<(), Ineligibility> {
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(Ineligibility::RoleNotPermitted { action, role })
    }
}

/// Requires the user's balance to cover `amount`.
///
/// # Errors
///
/// Returns `Ineligibility::InsufficientBalance` otherwise.
pub const fn require_balance(user: &User, amount: u64) -> Result<(), Ineligibility> {
    if user.balance >= amount {
        Ok(())
    } else {
        Err(Ineligibility::InsufficientBalance {
            user_id: user.user_id,
            available: user.balance,
            required: amount,
        })
    }
}

/// Succeeds while the kermesse still accepts mutation.
///
/// # Errors
///
/// Returns `Ineligibility::KermesseFinished` once the kermesse is finished.
pub const fn can_mutate_under_kermesse(kermesse: &Kermesse) -> Result<(), Ineligibility> {
    match kermesse.status {
        LifecycleStatus::Started => Ok(()),
        LifecycleStatus::Finished => Err(Ineligibility::KermesseFinished {
            kermesse_id: kermesse.kermesse_id,
        }),
    }
}

/// Decides whether a stand can be linked to `target`.
///
/// `linked` holds every kermesse the stand is currently linked to.
///
/// # Errors
///
/// Returns `KermesseFinished` if the target is closed, or
/// `StandAlreadyLinked` if any linked kermesse is still running.
pub fn can_link_stand(
    stand: &Stand,
    target: &Kermesse,
    linked: &[Kermesse],
) -> Result<(), Ineligibility> {
    can_mutate_under_kermesse(target)?;

    if let Some(running) = linked
        .iter()
        .find(|k| k.status == LifecycleStatus::Started)
    {
        return Err(Ineligibility::StandAlreadyLinked {
            stand_id: stand.stand_id,
            kermesse_id: running.kermesse_id,
        });
    }

    Ok(())
}

/// Decides whether a user can be linked to a kermesse.
///
/// # Errors
///
/// Returns `KermesseFinished`, `NotAStudent` or `AlreadyLinked`.
pub fn can_link_user(
    target: &Kermesse,
    user: &User,
    already_linked: bool,
) -> Result<(), Ineligibility> {
    can_mutate_under_kermesse(target)?;

    if user.role != UserRole::Student {
        return Err(Ineligibility::NotAStudent {
            user_id: user.user_id,
        });
    }

    if already_linked {
        return Err(Ineligibility::AlreadyLinked {
            user_id: user.user_id,
            kermesse_id: target.kermesse_id,
        });
    }

    Ok(())
}

/// Decides whether a kermesse can be completed.
///
/// # Errors
///
/// Returns `KermesseFinished` if already finished, or
/// `TombolasStillRunning` if any tombola under it is started.
pub fn can_complete_kermesse(
    kermesse: &Kermesse,
    tombolas: &[Tombola],
) -> Result<(), Ineligibility> {
    can_mutate_under_kermesse(kermesse)?;

    let running: usize = tombolas
        .iter()
        .filter(|t| t.kermesse_id == kermesse.kermesse_id && t.status == LifecycleStatus::Started)
        .count();

    if running > 0 {
        return Err(Ineligibility::TombolasStillRunning {
            kermesse_id: kermesse.kermesse_id,
            running,
        });
    }

    Ok(())
}

/// Decides whether `buyer` may buy `quantity` units at `stand`.
///
/// `kermesse` is the running kermesse the stand is linked to, if any.
/// `enrolled` tells whether the buyer is linked to that kermesse.
///
/// # Errors
///
/// Forbidden when the buyer's role cannot buy, the stand is not open,
/// the kermesse is not running or the buyer is not enrolled.
/// Bad request when a stock-tracked stand cannot cover the quantity.
pub fn can_buy_at_stand(
    buyer: &User,
    stand: &Stand,
    kermesse: Option<&Kermesse>,
    enrolled: bool,
    quantity: u32,
) -> Result<(), Ineligibility> {
    require_role(
        "buy at a stand",
        buyer.role,
        &[UserRole::Parent, UserRole::Student],
    )?;

    let Some(kermesse) = kermesse else {
        return Err(Ineligibility::StandNotOpen {
            stand_id: stand.stand_id,
        });
    };

    if kermesse.status != LifecycleStatus::Started {
        return Err(Ineligibility::KermesseNotStarted {
            kermesse_id: kermesse.kermesse_id,
        });
    }

    if !enrolled {
        return Err(Ineligibility::NotEnrolled {
            user_id: buyer.user_id,
            kermesse_id: kermesse.kermesse_id,
        });
    }

    let requested: u64 = u64::from(quantity);
    if stand.category.tracks_stock() && stand.stock < requested {
        return Err(Ineligibility::InsufficientStock {
            stand_id: stand.stand_id,
            available: stand.stock,
            requested,
        });
    }

    Ok(())
}

/// Decides whether `buyer` may buy a ticket for `tombola`.
///
/// # Errors
///
/// Bad request when the tombola is finished or the balance is short.
/// Forbidden when the buyer is not a student, or is not enrolled in a
/// running kermesse.
pub fn can_buy_ticket(
    buyer: &User,
    tombola: &Tombola,
    kermesse: &Kermesse,
    enrolled: bool,
) -> Result<(), Ineligibility> {
    if tombola.status != LifecycleStatus::Started {
        return Err(Ineligibility::TombolaFinished {
            tombola_id: tombola.tombola_id,
        });
    }

    require_role("buy a tombola ticket", buyer.role, &[UserRole::Student])?;
    require_balance(buyer, tombola.price)?;

    if kermesse.status != LifecycleStatus::Started {
        return Err(Ineligibility::KermesseNotStarted {
            kermesse_id: kermesse.kermesse_id,
        });
    }

    if !enrolled {
        return Err(Ineligibility::NotEnrolled {
            user_id: buyer.user_id,
            kermesse_id: kermesse.kermesse_id,
        });
    }

    Ok(())
}

/// Decides whether `actor_id` may record the outcome of a game participation.
///
/// # Errors
///
/// Returns `NotOwner` unless the actor holds the stand, then
/// `KermesseFinished`, `NotAGame` or `OutcomeAlreadyRecorded`.
pub fn can_record_outcome(
    participation: &Participation,
    stand: &Stand,
    kermesse: &Kermesse,
    actor_id: i64,
) -> Result<(), Ineligibility> {
    require_owner("stand", stand.stand_id, stand.holder_id, actor_id)?;
    can_mutate_under_kermesse(kermesse)?;

    if !participation.category.records_outcome() {
        return Err(Ineligibility::NotAGame {
            participation_id: participation.participation_id,
        });
    }

    if participation.status != LifecycleStatus::Started {
        return Err(Ineligibility::OutcomeAlreadyRecorded {
            participation_id: participation.participation_id,
        });
    }

    Ok(())
}

/// Decides whether `actor_id` may change a tombola's fields.
///
/// # Errors
///
/// Returns `NotOwner`, `KermesseFinished` or `TombolaFinished`.
pub fn can_modify_tombola(
    tombola: &Tombola,
    kermesse: &Kermesse,
    actor_id: i64,
) -> Result<(), Ineligibility> {
    require_owner(
        "kermesse",
        kermesse.kermesse_id,
        kermesse.organizer_id,
        actor_id,
    )?;
    can_mutate_under_kermesse(kermesse)?;

    if tombola.status != LifecycleStatus::Started {
        return Err(Ineligibility::TombolaFinished {
            tombola_id: tombola.tombola_id,
        });
    }

    Ok(())
}

/// Decides whether `actor_id` may draw the tombola winner.
///
/// `ticket_count` must be read inside the same transaction as the draw.
///
/// # Errors
///
/// Same as [`can_modify_tombola`], plus `NoTicketsSold`.
pub fn can_finish_tombola(
    tombola: &Tombola,
    kermesse: &Kermesse,
    actor_id: i64,
    ticket_count: usize,
) -> Result<(), Ineligibility> {
    can_modify_tombola(tombola, kermesse, actor_id)?;

    if ticket_count == 0 {
        return Err(Ineligibility::NoTicketsSold {
            tombola_id: tombola.tombola_id,
        });
    }

    Ok(())
}

/// Decides whether a stock change leaves the stand with a valid stock.
///
/// # Errors
///
/// Returns `InsufficientStock` when `delta` would take stock below zero.
pub fn can_modify_stand_stock(stand: &Stand, delta: i64) -> Result<(), Ineligibility> {
    if delta >= 0 {
        return Ok(());
    }

    let requested: u64 = delta.unsigned_abs();
    if stand.stock < requested {
        return Err(Ineligibility::InsufficientStock {
            stand_id: stand.stand_id,
            available: stand.stock,
            requested,
        });
    }

    Ok(())
}
