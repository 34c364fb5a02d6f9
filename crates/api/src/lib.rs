// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Command orchestration for the kermesse engine.
//!
//! Every public handler takes an [`AuthenticatedActor`] and a
//! [`Persistence`](kermesse_persistence::Persistence) handle, runs the
//! eligibility rules from `kermesse-domain` against rows read inside one
//! store transaction, and reports failures as [`ApiError`]. Transport
//! concerns live in the server crate.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod error;
pub mod handlers;
mod notifications;
mod password_policy;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService};
pub use error::{
    ApiError, ErrorKind, translate_domain_error, translate_ineligibility,
    translate_persistence_error,
};
pub use notifications::{Notice, NoopNotifier, NotificationSink, notify_organizer};
pub use password_policy::{AccountIdentity, PasswordPolicy, PasswordPolicyError};
pub use request_response::{
    BuyTicketRequest, ChangePasswordRequest, CreateKermesseRequest, CreateParticipationRequest,
    CreateStandRequest, CreateTombolaRequest, DrawResult, InviteChildRequest,
    InviteChildResponse, KermesseQuery, LinkStandRequest, LinkUserRequest, LinkUserResponse,
    ListStandsQuery, LoginRequest, ModifyKermesseRequest, ModifyStandRequest,
    ModifyTombolaRequest, ParticipationReceipt, RecordOutcomeRequest, RegisterRequest,
    SendJetonRequest, SendJetonResponse, TicketQuery, TicketReceipt, TopUpRequest,
    TopUpResponse,
};
