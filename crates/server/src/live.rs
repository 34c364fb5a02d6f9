// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live organizer notifications.
//!
//! Orchestrators hand notices to the [`LiveEventBroadcaster`] through the
//! `NotificationSink` trait once their transaction has committed. Every
//! WebSocket connection belongs to one organizer and only forwards that
//! organizer's notices. Delivery is best effort: with no connection open
//! a notice is dropped.

use axum::{
    extract::{
        State as AxumState, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::{IntoResponse, Response},
};
use futures::{SinkExt, stream::StreamExt};
use kermesse_api::{ApiError, NotificationSink};
use kermesse_domain::UserRole;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::session::SessionActor;
use crate::{AppState, HttpError};

/// Maximum number of notices buffered for slow connections.
/// Older notices are dropped once a receiver lags this far behind.
const EVENT_BUFFER_SIZE: usize = 100;

/// A notice addressed to one organizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizerNotice {
    /// The recipient.
    pub organizer_id: i64,
    /// The rendered notice.
    pub message: String,
}

/// Fan-out hub for organizer notices.
#[derive(Clone)]
pub struct LiveEventBroadcaster {
    tx: broadcast::Sender<OrganizerNotice>,
}

impl LiveEventBroadcaster {
    /// Creates a new broadcaster.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Publishes a notice to every open connection.
    ///
    /// Non-blocking. Without receivers the notice is dropped.
    pub fn broadcast(&self, notice: OrganizerNotice) {
        let organizer_id: i64 = notice.organizer_id;
        match self.tx.send(notice) {
            Ok(receivers) => debug!(organizer_id, receivers, "Broadcast notice"),
            Err(_) => debug!(organizer_id, "No live connection for notice"),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<OrganizerNotice> {
        self.tx.subscribe()
    }
}

impl Default for LiveEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for LiveEventBroadcaster {
    fn notify(&self, organizer_id: i64, message: &str) {
        self.broadcast(OrganizerNotice {
            organizer_id,
            message: message.to_string(),
        });
    }
}

/// Upgrades an organizer's connection to a notification stream.
///
/// # Errors
///
/// Responds 403 when the actor is not an organizer. A missing or invalid
/// actor context is rejected with 401 before the upgrade.
pub async fn live_events_handler(
    SessionActor(actor): SessionActor,
    AxumState(app_state): AxumState<AppState>,
    ws: WebSocketUpgrade,
) -> Response {
    if actor.role != UserRole::Organizer {
        return HttpError::from(ApiError::Forbidden {
            rule: String::from("role_not_permitted"),
            message: format!("Role {} may not subscribe to notifications", actor.role),
        })
        .into_response();
    }

    let broadcaster = app_state.broadcaster;
    ws.on_upgrade(move |socket| handle_socket(socket, broadcaster.subscribe(), actor.id))
}

/// Forwards one organizer's notices until either side goes away.
async fn handle_socket(
    socket: WebSocket,
    mut rx: broadcast::Receiver<OrganizerNotice>,
    organizer_id: i64,
) {
    info!(organizer_id, "Organizer connected to notification stream");

    let (mut sender, mut receiver) = socket.split();

    let connected: String = serde_json::json!({
        "event": "connected",
        "timestamp": time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Iso8601::DEFAULT)
            .unwrap_or_else(|_| String::from("unknown")),
    })
    .to_string();
    if sender.send(Message::Text(connected.into())).await.is_err() {
        warn!(organizer_id, "Failed to send connection confirmation");
        return;
    }

    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(notice) if notice.organizer_id == organizer_id => {
                    if sender.send(Message::Text(notice.message.into())).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(organizer_id, skipped, "Notification stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(_) | Message::Binary(_)) => {
                    warn!(organizer_id, "Ignoring client message on notification stream");
                }
                Ok(Message::Close(_)) => break,
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Err(e) => {
                    error!(organizer_id, ?e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    info!(organizer_id, "Organizer disconnected from notification stream");
}
