// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Actor extraction at the server boundary.
//!
//! Token validation happens upstream; requests reach this server carrying
//! the verified actor in two headers. The claimed actor is checked
//! against the store before any handler runs.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use kermesse_api::{AuthenticatedActor, AuthenticationService, ErrorKind};
use kermesse_domain::UserRole;
use tracing::{debug, warn};

use crate::{AppState, ErrorResponse};

/// Header carrying the acting user's id.
pub const ACTOR_ID_HEADER: &str = "X-Actor-Id";
/// Header carrying the acting user's role.
pub const ACTOR_ROLE_HEADER: &str = "X-Actor-Role";

/// Extractor for the verified actor.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(
///     SessionActor(actor): SessionActor,
/// ) -> Result<Json<Response>, HttpError> {
///     // actor: AuthenticatedActor
/// }
/// ```
///
/// # Errors
///
/// Rejects with 401 Unauthorized if:
/// - Either header is missing
/// - The id is not an integer or the role is unknown
/// - No user has that id, or the user holds a different role
pub struct SessionActor(pub AuthenticatedActor);

impl FromRequestParts<AppState> for SessionActor {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let actor_id: i64 = header_value(parts, ACTOR_ID_HEADER)?
            .parse()
            .map_err(|_| {
                warn!("Actor id header is not an integer");
                SessionError::InvalidHeader(ACTOR_ID_HEADER)
            })?;
        let role: UserRole = header_value(parts, ACTOR_ROLE_HEADER)?
            .parse()
            .map_err(|_| {
                warn!("Actor role header is not a known role");
                SessionError::InvalidHeader(ACTOR_ROLE_HEADER)
            })?;

        let mut persistence = state.persistence.lock().await;
        let actor: AuthenticatedActor =
            AuthenticationService::authenticate(&mut persistence, actor_id, role).map_err(|e| {
                warn!(actor_id, error = %e, "Actor verification failed");
                SessionError::Rejected(e.to_string())
            })?;
        drop(persistence);

        debug!(actor_id, role = %actor.role, "Actor verified");
        Ok(Self(actor))
    }
}

fn header_value<'a>(parts: &'a Parts, name: &'static str) -> Result<&'a str, SessionError> {
    parts
        .headers
        .get(name)
        .ok_or_else(|| {
            debug!(header = name, "Missing actor header");
            SessionError::MissingHeader(name)
        })?
        .to_str()
        .map_err(|_| {
            warn!(header = name, "Invalid actor header encoding");
            SessionError::InvalidHeader(name)
        })
}

/// Actor extraction errors. All of them answer 401.
#[derive(Debug)]
pub enum SessionError {
    /// A required header is missing.
    MissingHeader(&'static str),
    /// A header could not be parsed.
    InvalidHeader(&'static str),
    /// The claimed actor does not match the store.
    Rejected(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::MissingHeader(name) => format!("Missing {name} header"),
            Self::InvalidHeader(name) => format!("Invalid {name} header"),
            Self::Rejected(reason) => reason,
        };

        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: ErrorKind::Unauthorized.as_str().to_string(),
            message,
        });
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
