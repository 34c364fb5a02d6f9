// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Stand management.

use kermesse_domain::{Stand, UserRole, can_modify_stand_stock, validate_stand_fields};
use kermesse_persistence::{NewStand, Persistence, StandFilter};
use tracing::info;

use super::require_found;
use crate::auth::AuthenticatedActor;
use crate::error::{ApiError, translate_domain_error};
use crate::request_response::{CreateStandRequest, ListStandsQuery, ModifyStandRequest};

/// Opens the acting stand holder's stand.
///
/// Categories without stock always start at zero stock.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not a stand holder
/// - A field is invalid
/// - The holder already owns a stand
pub fn create_stand(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: CreateStandRequest,
) -> Result<Stand, ApiError> {
    actor.require_role("create a stand", &[UserRole::StandHolder])?;

    let stock: u64 = if request.category.tracks_stock() {
        request.stock
    } else {
        0
    };
    validate_stand_fields(&request.name, &request.description, request.price, stock)
        .map_err(translate_domain_error)?;

    let stand: Stand = persistence.immediate_transaction(|tx| -> Result<Stand, ApiError> {
        if let Some(existing) = tx.get_stand_by_holder(actor.id)? {
            return Err(ApiError::Conflict {
                resource_type: String::from("Stand"),
                message: format!(
                    "Stand holder {} already owns stand {}",
                    actor.id, existing.stand_id
                ),
            });
        }

        let stand_id: i64 = tx.create_stand(&NewStand {
            holder_id: actor.id,
            name: &request.name,
            description: &request.description,
            category: request.category,
            price: request.price,
            stock,
        })?;

        require_found(tx.get_stand(stand_id)?, "Stand", stand_id)
    })?;

    info!(
        stand_id = stand.stand_id,
        holder_id = actor.id,
        category = %stand.category,
        "Stand created"
    );
    Ok(stand)
}

/// Edits the acting holder's stand.
///
/// A new stock value is applied as a signed delta against the current
/// stock, so concurrent purchases are never overwritten.
///
/// # Errors
///
/// Returns an error if:
/// - The actor has no stand
/// - A field is invalid
/// - Stock is given for a category without stock
/// - Purchases drained the stock below what the delta removes
pub fn modify_stand(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: ModifyStandRequest,
) -> Result<Stand, ApiError> {
    actor.require_role("modify a stand", &[UserRole::StandHolder])?;

    let stand: Stand = persistence.immediate_transaction(|tx| -> Result<Stand, ApiError> {
        let current: Stand = require_found(tx.get_stand_by_holder(actor.id)?, "Stand", actor.id)?;

        let name: &str = request.name.as_deref().unwrap_or(&current.name);
        let description: &str = request.description.as_deref().unwrap_or(&current.description);
        let price: u64 = request.price.unwrap_or(current.price);
        let target_stock: u64 = match request.stock {
            Some(_) if !current.category.tracks_stock() => {
                return Err(ApiError::InvalidInput {
                    field: String::from("stock"),
                    message: format!("{} stands do not track stock", current.category),
                });
            }
            Some(stock) => stock,
            None => current.stock,
        };

        validate_stand_fields(name, description, price, target_stock)
            .map_err(translate_domain_error)?;

        tx.update_stand(current.stand_id, name, description, price)?;

        if target_stock != current.stock {
            let delta: i64 = stock_delta(current.stock, target_stock)?;
            can_modify_stand_stock(&current, delta)?;
            tx.adjust_stock(current.stand_id, delta)?;
        }

        require_found(tx.get_stand(current.stand_id)?, "Stand", current.stand_id)
    })?;

    info!(stand_id = stand.stand_id, stock = stand.stock, "Stand modified");
    Ok(stand)
}

fn stock_delta(current: u64, target: u64) -> Result<i64, ApiError> {
    let out_of_range = || ApiError::InvalidInput {
        field: String::from("stock"),
        message: String::from("Stock change is out of range"),
    };

    if target >= current {
        i64::try_from(target - current).map_err(|_| out_of_range())
    } else {
        i64::try_from(current - target)
            .map(|removed| -removed)
            .map_err(|_| out_of_range())
    }
}

/// Returns a stand by id.
///
/// # Errors
///
/// Returns `ResourceNotFound` if it does not exist.
pub fn get_stand(persistence: &mut Persistence, stand_id: i64) -> Result<Stand, ApiError> {
    let stand: Option<Stand> = persistence.read(|tx| tx.get_stand(stand_id))?;
    require_found(stand, "Stand", stand_id)
}

/// Returns the acting holder's stand.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the holder has none yet.
pub fn get_own_stand(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<Stand, ApiError> {
    actor.require_role("view own stand", &[UserRole::StandHolder])?;
    let stand: Option<Stand> = persistence.read(|tx| tx.get_stand_by_holder(actor.id))?;
    require_found(stand, "Stand", actor.id)
}

/// Lists stands.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_stands(
    persistence: &mut Persistence,
    query: ListStandsQuery,
) -> Result<Vec<Stand>, ApiError> {
    let filter: StandFilter = StandFilter {
        kermesse_id: query.kermesse_id,
        ready_only: query.ready,
    };
    Ok(persistence.read(|tx| tx.list_stands(&filter))?)
}
