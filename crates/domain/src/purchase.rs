// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Purchase pricing.

use crate::error::DomainError;
use crate::types::{Stand, StandCategory};

/// Price of a purchase, computed once and snapshotted into the participation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseQuote {
    /// Units bought.
    pub quantity: u32,
    /// Stand price per unit at quote time.
    pub unit_price: u64,
    /// `unit_price * quantity`.
    pub total_price: u64,
}

/// Resolves the effective quantity of a purchase.
///
/// Stock-tracked categories require an explicit, non-zero quantity.
/// Other categories always sell exactly one unit; a quantity other than
/// one is rejected rather than silently ignored.
///
/// # Errors
///
/// Returns `DomainError::InvalidQuantity` when the quantity does not fit the category.
pub fn resolve_quantity(
    category: StandCategory,
    requested: Option<u32>,
) -> Result<u32, DomainError> {
    match (category.tracks_stock(), requested) {
        (true, None) => Err(DomainError::InvalidQuantity {
            category: category.as_str().to_string(),
            reason: "quantity is required".to_string(),
        }),
        (true, Some(0)) => Err(DomainError::InvalidQuantity {
            category: category.as_str().to_string(),
            reason: "quantity must be at least 1".to_string(),
        }),
        (true, Some(quantity)) => Ok(quantity),
        (false, None | Some(1)) => Ok(1),
        (false, Some(quantity)) => Err(DomainError::InvalidQuantity {
            category: category.as_str().to_string(),
            reason: format!("only a single unit can be bought, got {quantity}"),
        }),
    }
}

/// Computes the price of buying `quantity` units at `stand`.
///
/// # Errors
///
/// Returns `DomainError::PriceOverflow` if the total does not fit in a balance.
pub fn quote_purchase(stand: &Stand, quantity: u32) -> Result<PurchaseQuote, DomainError> {
    let total_price: u64 = stand
        .price
        .checked_mul(u64::from(quantity))
        .filter(|total| i64::try_from(*total).is_ok())
        .ok_or(DomainError::PriceOverflow {
            unit_price: stand.price,
            quantity,
        })?;

    Ok(PurchaseQuote {
        quantity,
        unit_price: stand.price,
        total_price,
    })
}
