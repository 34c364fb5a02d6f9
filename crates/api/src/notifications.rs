// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Organizer notifications.
//!
//! Orchestrators emit a [`Notice`] after their transaction commits. Delivery
//! is best-effort: a sink never reports failure back, and nothing here can
//! undo a committed write.

use serde::Serialize;
use tracing::debug;

/// Receives "organizer X should be told Y" events.
pub trait NotificationSink: Send + Sync {
    /// Delivers `message` to `organizer_id` if they are listening.
    fn notify(&self, organizer_id: i64, message: &str);
}

/// A sink that drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl NotificationSink for NoopNotifier {
    fn notify(&self, organizer_id: i64, _message: &str) {
        debug!(organizer_id, "Notification dropped");
    }
}

/// Events an organizer is told about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notice {
    /// Someone bought at a stand of one of the organizer's kermesses.
    Participation {
        kermesse_id: i64,
        stand_id: i64,
        participation_id: i64,
        user_id: i64,
        amount: u64,
    },
    /// A tombola ticket was sold.
    TicketSold {
        kermesse_id: i64,
        tombola_id: i64,
        ticket_id: i64,
        user_id: i64,
    },
    /// A tombola was drawn.
    TombolaDrawn {
        kermesse_id: i64,
        tombola_id: i64,
        winning_ticket_id: i64,
        winner_id: i64,
    },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Participation {
                stand_id,
                user_id,
                amount,
                ..
            } => write!(f, "User {user_id} spent {amount} at stand {stand_id}"),
            Self::TicketSold {
                tombola_id,
                user_id,
                ..
            } => write!(f, "User {user_id} bought a ticket for tombola {tombola_id}"),
            Self::TombolaDrawn {
                tombola_id,
                winning_ticket_id,
                ..
            } => write!(f, "Tombola {tombola_id} drawn: ticket {winning_ticket_id} wins"),
        }
    }
}

impl Notice {
    /// Renders the notice as a JSON message.
    #[must_use]
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.to_string())
    }
}

/// Hands a notice to the sink.
pub fn notify_organizer(sink: &dyn NotificationSink, organizer_id: i64, notice: &Notice) {
    debug!(organizer_id, notice = %notice, "Notifying organizer");
    sink.notify(organizer_id, &notice.to_message());
}
