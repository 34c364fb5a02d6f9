// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tombolas, ticket sales and the winner draw.

use kermesse_domain::{
    Kermesse, LifecycleStatus, Ticket, Tombola, User, UserRole, can_buy_ticket,
    can_finish_tombola, can_modify_tombola, can_mutate_under_kermesse, pick_winner, require_owner,
    validate_tombola_fields,
};
use kermesse_persistence::{NewTombola, Persistence, TicketFilter, TombolaFilter};
use tracing::info;

use super::require_found;
use crate::auth::AuthenticatedActor;
use crate::error::{ApiError, translate_domain_error};
use crate::notifications::{Notice, NotificationSink, notify_organizer};
use crate::request_response::{
    BuyTicketRequest, CreateTombolaRequest, DrawResult, KermesseQuery, ModifyTombolaRequest,
    TicketQuery, TicketReceipt,
};

/// Creates a tombola under a running kermesse.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an organizer, or not this kermesse's organizer
/// - The kermesse does not exist or is finished
/// - A field is invalid
pub fn create_tombola(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: CreateTombolaRequest,
) -> Result<Tombola, ApiError> {
    actor.require_role("create a tombola", &[UserRole::Organizer])?;
    validate_tombola_fields(&request.name, &request.prize, request.price)
        .map_err(translate_domain_error)?;

    let tombola: Tombola = persistence.immediate_transaction(|tx| -> Result<Tombola, ApiError> {
        let kermesse: Kermesse = require_found(
            tx.get_kermesse(request.kermesse_id)?,
            "Kermesse",
            request.kermesse_id,
        )?;
        require_owner(
            "kermesse",
            kermesse.kermesse_id,
            kermesse.organizer_id,
            actor.id,
        )?;
        can_mutate_under_kermesse(&kermesse)?;

        let tombola_id: i64 = tx.create_tombola(&NewTombola {
            kermesse_id: kermesse.kermesse_id,
            name: &request.name,
            prize: &request.prize,
            price: request.price,
        })?;
        require_found(tx.get_tombola(tombola_id)?, "Tombola", tombola_id)
    })?;

    info!(
        tombola_id = tombola.tombola_id,
        kermesse_id = tombola.kermesse_id,
        price = tombola.price,
        "Tombola created"
    );
    Ok(tombola)
}

/// Edits a running tombola.
///
/// # Errors
///
/// Returns an error if:
/// - The tombola does not exist
/// - The actor is not the kermesse's organizer
/// - The tombola or its kermesse is finished
/// - A field is invalid
pub fn modify_tombola(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    tombola_id: i64,
    request: ModifyTombolaRequest,
) -> Result<Tombola, ApiError> {
    let tombola: Tombola = persistence.immediate_transaction(|tx| -> Result<Tombola, ApiError> {
        let current: Tombola = require_found(tx.get_tombola(tombola_id)?, "Tombola", tombola_id)?;
        let kermesse: Kermesse = require_found(
            tx.get_kermesse(current.kermesse_id)?,
            "Kermesse",
            current.kermesse_id,
        )?;
        can_modify_tombola(&current, &kermesse, actor.id)?;

        let name: &str = request.name.as_deref().unwrap_or(&current.name);
        let prize: &str = request.prize.as_deref().unwrap_or(&current.prize);
        let price: u64 = request.price.unwrap_or(current.price);
        validate_tombola_fields(name, prize, price).map_err(translate_domain_error)?;

        tx.update_tombola(tombola_id, name, prize, price)?;
        require_found(tx.get_tombola(tombola_id)?, "Tombola", tombola_id)
    })?;

    info!(tombola_id, "Tombola modified");
    Ok(tombola)
}

/// Sells a ticket to the acting student.
///
/// The buyer is debited the ticket price and a non-winning ticket is
/// recorded in the same transaction. No account is credited.
///
/// # Errors
///
/// Returns an error if:
/// - The tombola or buyer does not exist
/// - The tombola is finished
/// - The buyer is not a student, or not enrolled in a running kermesse
/// - The balance does not cover the price
pub fn buy_ticket(
    persistence: &mut Persistence,
    notifier: &dyn NotificationSink,
    actor: &AuthenticatedActor,
    request: BuyTicketRequest,
) -> Result<TicketReceipt, ApiError> {
    let (receipt, kermesse) =
        persistence.immediate_transaction(|tx| -> Result<(TicketReceipt, Kermesse), ApiError> {
            let tombola: Tombola =
                require_found(tx.get_tombola(request.tombola_id)?, "Tombola", request.tombola_id)?;
            let buyer: User = require_found(tx.get_user(actor.id)?, "User", actor.id)?;
            let kermesse: Kermesse = require_found(
                tx.get_kermesse(tombola.kermesse_id)?,
                "Kermesse",
                tombola.kermesse_id,
            )?;
            let enrolled: bool = tx.is_user_linked(kermesse.kermesse_id, buyer.user_id)?;
            can_buy_ticket(&buyer, &tombola, &kermesse, enrolled)?;

            tx.debit(buyer.user_id, tombola.price)?;
            let ticket_id: i64 = tx.insert_ticket(tombola.tombola_id, buyer.user_id)?;

            let ticket: Ticket = require_found(tx.get_ticket(ticket_id)?, "Ticket", ticket_id)?;
            let buyer_balance: u64 =
                require_found(tx.get_user(buyer.user_id)?, "User", buyer.user_id)?.balance;

            Ok((
                TicketReceipt {
                    ticket,
                    buyer_balance,
                },
                kermesse,
            ))
        })?;

    info!(
        ticket_id = receipt.ticket.ticket_id,
        tombola_id = request.tombola_id,
        user_id = actor.id,
        "Ticket sold"
    );

    notify_organizer(
        notifier,
        kermesse.organizer_id,
        &Notice::TicketSold {
            kermesse_id: kermesse.kermesse_id,
            tombola_id: request.tombola_id,
            ticket_id: receipt.ticket.ticket_id,
            user_id: actor.id,
        },
    );

    Ok(receipt)
}

/// Finishes a tombola and draws its winner.
///
/// This function:
/// - Verifies the actor organizes the tombola's kermesse
/// - Requires the tombola and kermesse to be running
/// - Snapshots the ticket set, flips the tombola to FINISHED and flags one
///   ticket picked uniformly at random, all in one transaction
/// - Notifies the organizer after commit
///
/// The write lock is held from the ticket snapshot to commit, so no ticket
/// can be sold while the draw is in progress.
///
/// # Errors
///
/// Returns an error if:
/// - The tombola does not exist
/// - The actor is not the organizer
/// - The tombola is already finished (`Conflict`)
/// - The kermesse is finished or no ticket was sold
pub fn finish_tombola(
    persistence: &mut Persistence,
    notifier: &dyn NotificationSink,
    actor: &AuthenticatedActor,
    tombola_id: i64,
) -> Result<DrawResult, ApiError> {
    let (result, organizer_id) =
        persistence.immediate_transaction(|tx| -> Result<(DrawResult, i64), ApiError> {
            let tombola: Tombola =
                require_found(tx.get_tombola(tombola_id)?, "Tombola", tombola_id)?;
            let kermesse: Kermesse = require_found(
                tx.get_kermesse(tombola.kermesse_id)?,
                "Kermesse",
                tombola.kermesse_id,
            )?;
            require_owner(
                "kermesse",
                kermesse.kermesse_id,
                kermesse.organizer_id,
                actor.id,
            )?;
            tombola
                .status
                .validate_transition(LifecycleStatus::Finished)
                .map_err(|err| ApiError::Conflict {
                    resource_type: String::from("Tombola"),
                    message: format!("Tombola {tombola_id} has already been drawn: {err}"),
                })?;

            let ticket_ids: Vec<i64> = tx.ticket_ids_for_tombola(tombola_id)?;
            can_finish_tombola(&tombola, &kermesse, actor.id, ticket_ids.len())?;

            tx.finish_tombola(tombola_id)?;

            let winning_ticket_id: i64 = pick_winner(&ticket_ids, &mut rand::rng())
                .ok_or_else(|| ApiError::Internal {
                    message: format!("No ticket could be drawn for tombola {tombola_id}"),
                })?;
            tx.mark_winner(tombola_id, winning_ticket_id)?;

            let winners: i64 = tx.count_winners(tombola_id)?;
            if winners != 1 {
                return Err(ApiError::Internal {
                    message: format!("Tombola {tombola_id} has {winners} winning tickets"),
                });
            }

            let tombola: Tombola =
                require_found(tx.get_tombola(tombola_id)?, "Tombola", tombola_id)?;
            let winning_ticket: Ticket =
                require_found(tx.get_ticket(winning_ticket_id)?, "Ticket", winning_ticket_id)?;

            Ok((
                DrawResult {
                    tombola,
                    winning_ticket,
                },
                kermesse.organizer_id,
            ))
        })?;

    info!(
        tombola_id,
        winning_ticket_id = result.winning_ticket.ticket_id,
        winner_id = result.winning_ticket.user_id,
        "Tombola drawn"
    );

    notify_organizer(
        notifier,
        organizer_id,
        &Notice::TombolaDrawn {
            kermesse_id: result.tombola.kermesse_id,
            tombola_id,
            winning_ticket_id: result.winning_ticket.ticket_id,
            winner_id: result.winning_ticket.user_id,
        },
    );

    Ok(result)
}

/// Returns a tombola by id.
///
/// # Errors
///
/// Returns `ResourceNotFound` if it does not exist.
pub fn get_tombola(persistence: &mut Persistence, tombola_id: i64) -> Result<Tombola, ApiError> {
    let tombola: Option<Tombola> = persistence.read(|tx| tx.get_tombola(tombola_id))?;
    require_found(tombola, "Tombola", tombola_id)
}

/// Lists tombolas.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_tombolas(
    persistence: &mut Persistence,
    query: KermesseQuery,
) -> Result<Vec<Tombola>, ApiError> {
    let filter: TombolaFilter = TombolaFilter {
        kermesse_id: query.kermesse_id,
    };
    Ok(persistence.read(|tx| tx.list_tombolas(&filter))?)
}

/// Returns a ticket by id.
///
/// # Errors
///
/// Returns `ResourceNotFound` if it does not exist.
pub fn get_ticket(persistence: &mut Persistence, ticket_id: i64) -> Result<Ticket, ApiError> {
    let ticket: Option<Ticket> = persistence.read(|tx| tx.get_ticket(ticket_id))?;
    require_found(ticket, "Ticket", ticket_id)
}

/// Lists the tickets visible to the actor.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_tickets(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    query: TicketQuery,
) -> Result<Vec<Ticket>, ApiError> {
    let filter: TicketFilter = TicketFilter {
        scope: actor.scope(),
        tombola_id: query.tombola_id,
    };
    Ok(persistence.read(|tx| tx.list_tickets(&filter))?)
}
