// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Stand purchases and game outcomes.

use kermesse_domain::{
    Kermesse, LifecycleStatus, Participation, PurchaseQuote, Stand, User, can_buy_at_stand,
    can_record_outcome, quote_purchase, require_balance, resolve_quantity, validate_points,
};
use kermesse_persistence::{NewParticipation, ParticipationFilter, Persistence};
use tracing::info;

use super::require_found;
use crate::auth::AuthenticatedActor;
use crate::error::{ApiError, translate_domain_error};
use crate::notifications::{Notice, NotificationSink, notify_organizer};
use crate::request_response::{
    CreateParticipationRequest, KermesseQuery, ParticipationReceipt, RecordOutcomeRequest,
};

/// Buys at a stand.
///
/// This function:
/// - Loads the stand and the buyer
/// - Checks enrollment, kermesse status and stock against fresh rows
/// - Prices the purchase and checks the buyer's balance
/// - Debits the buyer, credits the stand holder, decrements stock and
///   records the participation, all in one transaction
/// - Notifies the kermesse organizer after commit
///
/// Writes always run in the same order (buyer balance, holder balance,
/// stock, participation) so concurrent purchases cannot deadlock.
///
/// # Errors
///
/// Returns an error if:
/// - The stand or buyer does not exist
/// - The buyer is not a parent or student, or not enrolled
/// - The stand is not part of a running kermesse
/// - The quantity is invalid or the stock is short
/// - The balance does not cover the price
pub fn create_participation(
    persistence: &mut Persistence,
    notifier: &dyn NotificationSink,
    actor: &AuthenticatedActor,
    request: CreateParticipationRequest,
) -> Result<ParticipationReceipt, ApiError> {
    let (receipt, organizer_id) = persistence.immediate_transaction(
        |tx| -> Result<(ParticipationReceipt, i64), ApiError> {
            let stand: Stand =
                require_found(tx.get_stand(request.stand_id)?, "Stand", request.stand_id)?;
            let buyer: User = require_found(tx.get_user(actor.id)?, "User", actor.id)?;

            let quantity: u32 =
                resolve_quantity(stand.category, request.quantity).map_err(translate_domain_error)?;

            let kermesse: Option<Kermesse> = tx.running_kermesse_for_stand(stand.stand_id)?;
            let enrolled: bool = match &kermesse {
                Some(kermesse) => tx.is_user_linked(kermesse.kermesse_id, buyer.user_id)?,
                None => false,
            };
            can_buy_at_stand(&buyer, &stand, kermesse.as_ref(), enrolled, quantity)?;
            let kermesse: Kermesse = kermesse.ok_or_else(|| ApiError::Internal {
                message: String::from("Eligible stand has no running kermesse"),
            })?;

            let quote: PurchaseQuote =
                quote_purchase(&stand, quantity).map_err(translate_domain_error)?;
            require_balance(&buyer, quote.total_price)?;

            tx.debit(buyer.user_id, quote.total_price)?;
            tx.credit(stand.holder_id, quote.total_price)?;
            if stand.category.tracks_stock() {
                tx.adjust_stock(stand.stand_id, -i64::from(quote.quantity))?;
            }

            let status: LifecycleStatus = if stand.category.records_outcome() {
                LifecycleStatus::Started
            } else {
                LifecycleStatus::Finished
            };
            let participation_id: i64 = tx.insert_participation(&NewParticipation {
                kermesse_id: kermesse.kermesse_id,
                stand_id: stand.stand_id,
                user_id: buyer.user_id,
                category: stand.category,
                quantity: quote.quantity,
                balance: quote.total_price,
                status,
            })?;

            let participation: Participation = require_found(
                tx.get_participation(participation_id)?,
                "Participation",
                participation_id,
            )?;
            let buyer_balance: u64 =
                require_found(tx.get_user(buyer.user_id)?, "User", buyer.user_id)?.balance;
            let stand_stock: u64 =
                require_found(tx.get_stand(stand.stand_id)?, "Stand", stand.stand_id)?.stock;

            Ok((
                ParticipationReceipt {
                    participation,
                    buyer_balance,
                    stand_stock,
                },
                kermesse.organizer_id,
            ))
        },
    )?;

    let participation: &Participation = &receipt.participation;
    info!(
        participation_id = participation.participation_id,
        kermesse_id = participation.kermesse_id,
        stand_id = participation.stand_id,
        user_id = participation.user_id,
        amount = participation.balance,
        "Participation created"
    );

    notify_organizer(
        notifier,
        organizer_id,
        &Notice::Participation {
            kermesse_id: participation.kermesse_id,
            stand_id: participation.stand_id,
            participation_id: participation.participation_id,
            user_id: participation.user_id,
            amount: participation.balance,
        },
    );

    Ok(receipt)
}

/// Records the outcome of a game participation.
///
/// # Errors
///
/// Returns an error if:
/// - The participation does not exist
/// - The actor does not hold the stand
/// - The kermesse is finished
/// - The participation is not a game or already has an outcome
pub fn record_outcome(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    participation_id: i64,
    request: RecordOutcomeRequest,
) -> Result<Participation, ApiError> {
    validate_points(request.points).map_err(translate_domain_error)?;

    let participation = persistence.immediate_transaction(|tx| -> Result<Participation, ApiError> {
        let participation: Participation = require_found(
            tx.get_participation(participation_id)?,
            "Participation",
            participation_id,
        )?;
        let stand: Stand =
            require_found(tx.get_stand(participation.stand_id)?, "Stand", participation.stand_id)?;
        let kermesse: Kermesse = require_found(
            tx.get_kermesse(participation.kermesse_id)?,
            "Kermesse",
            participation.kermesse_id,
        )?;
        can_record_outcome(&participation, &stand, &kermesse, actor.id)?;

        tx.record_outcome(participation_id, request.points)?;
        require_found(
            tx.get_participation(participation_id)?,
            "Participation",
            participation_id,
        )
    })?;

    info!(participation_id, points = request.points, "Outcome recorded");
    Ok(participation)
}

/// Returns a participation by id.
///
/// # Errors
///
/// Returns `ResourceNotFound` if it does not exist.
pub fn get_participation(
    persistence: &mut Persistence,
    participation_id: i64,
) -> Result<Participation, ApiError> {
    let participation: Option<Participation> =
        persistence.read(|tx| tx.get_participation(participation_id))?;
    require_found(participation, "Participation", participation_id)
}

/// Lists the participations visible to the actor.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_participations(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    query: KermesseQuery,
) -> Result<Vec<Participation>, ApiError> {
    let filter: ParticipationFilter = ParticipationFilter {
        scope: actor.scope(),
        kermesse_id: query.kermesse_id,
    };
    Ok(persistence.read(|tx| tx.list_participations(&filter))?)
}
