// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Requests are typed commands: each field is validated and converted once
//! by the orchestrator that receives it.

use kermesse_domain::{Participation, StandCategory, Ticket, Tombola, User, UserRole};
use serde::{Deserialize, Serialize};

// ============================================================================
// Users
// ============================================================================

/// API request to register a new account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Any role except `STUDENT`; students are invited by their parent.
    pub role: UserRole,
}

/// API request to check credentials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// API request to change the actor's own password.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// API request for a parent to create a student account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InviteChildRequest {
    pub name: String,
    pub email: String,
}

/// API response for a created student account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InviteChildResponse {
    /// The new student.
    pub student: User,
    /// Generated password, returned only once.
    pub temporary_password: String,
}

/// API request for a parent to move balance to one of their children.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SendJetonRequest {
    pub student_id: i64,
    pub amount: u64,
}

/// API response for a parent-to-child transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendJetonResponse {
    pub parent_balance: u64,
    pub student_balance: u64,
}

/// An externally confirmed payment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopUpRequest {
    pub user_id: i64,
    pub amount: u64,
    /// Payment provider reference; each may be applied once.
    pub reference: String,
}

/// API response for an applied top-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopUpResponse {
    pub top_up_id: i64,
    pub user_id: i64,
    pub balance: u64,
}

// ============================================================================
// Stands
// ============================================================================

/// API request to open a stand.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateStandRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: StandCategory,
    pub price: u64,
    /// Ignored for categories without stock.
    #[serde(default)]
    pub stock: u64,
}

/// API request to edit the actor's stand. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ModifyStandRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<u64>,
    /// New absolute stock, applied as a delta.
    pub stock: Option<u64>,
}

/// Stand listing filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ListStandsQuery {
    pub kermesse_id: Option<i64>,
    /// Only stands free to join a kermesse.
    #[serde(default)]
    pub ready: bool,
}

// ============================================================================
// Kermesses
// ============================================================================

/// API request to create a kermesse.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateKermesseRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// API request to edit a kermesse. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ModifyKermesseRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// API request to enroll a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LinkUserRequest {
    pub user_id: i64,
}

/// API response for an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkUserResponse {
    pub kermesse_id: i64,
    pub user_id: i64,
    /// The student's parent, when one was linked alongside.
    pub parent_id: Option<i64>,
}

/// API request to attach a stand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LinkStandRequest {
    pub stand_id: i64,
}

// ============================================================================
// Participations
// ============================================================================

/// API request to buy at a stand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CreateParticipationRequest {
    pub stand_id: i64,
    /// Required for stocked categories, must be absent or 1 otherwise.
    pub quantity: Option<u32>,
}

/// API response for a completed purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipationReceipt {
    pub participation: Participation,
    pub buyer_balance: u64,
    pub stand_stock: u64,
}

/// API request to record a game outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RecordOutcomeRequest {
    pub points: u32,
}

/// Filter scoped to a kermesse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct KermesseQuery {
    pub kermesse_id: Option<i64>,
}

// ============================================================================
// Tombolas & Tickets
// ============================================================================

/// API request to create a tombola.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateTombolaRequest {
    pub kermesse_id: i64,
    pub name: String,
    pub prize: String,
    pub price: u64,
}

/// API request to edit a tombola. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ModifyTombolaRequest {
    pub name: Option<String>,
    pub prize: Option<String>,
    pub price: Option<u64>,
}

/// API response for a tombola draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawResult {
    pub tombola: Tombola,
    pub winning_ticket: Ticket,
}

/// API request to buy a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BuyTicketRequest {
    pub tombola_id: i64,
}

/// API response for a sold ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketReceipt {
    pub ticket: Ticket,
    pub buyer_balance: u64,
}

/// Ticket listing filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TicketQuery {
    pub tombola_id: Option<i64>,
}
