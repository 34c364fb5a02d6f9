// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::make_stand;
use crate::{DomainError, PurchaseQuote, StandCategory, quote_purchase, resolve_quantity};

#[test]
fn test_quantity_scales_price() {
    let stand = make_stand(1, 2, StandCategory::Food, 30, 2);
    let quote: PurchaseQuote = quote_purchase(&stand, 2).unwrap();
    assert_eq!(quote.quantity, 2);
    assert_eq!(quote.unit_price, 30);
    assert_eq!(quote.total_price, 60);
}

#[test]
fn test_consumables_require_quantity() {
    assert!(matches!(
        resolve_quantity(StandCategory::Food, None),
        Err(DomainError::InvalidQuantity { .. })
    ));
    assert!(matches!(
        resolve_quantity(StandCategory::Drink, Some(0)),
        Err(DomainError::InvalidQuantity { .. })
    ));
    assert_eq!(resolve_quantity(StandCategory::Food, Some(4)).unwrap(), 4);
}

#[test]
fn test_games_sell_a_single_unit() {
    assert_eq!(resolve_quantity(StandCategory::Game, None).unwrap(), 1);
    assert_eq!(resolve_quantity(StandCategory::Game, Some(1)).unwrap(), 1);
    assert!(matches!(
        resolve_quantity(StandCategory::Game, Some(2)),
        Err(DomainError::InvalidQuantity { .. })
    ));
}

#[test]
fn test_overflowing_total_is_rejected() {
    let stand = make_stand(1, 2, StandCategory::Food, u64::MAX / 2, 10);
    assert_eq!(
        quote_purchase(&stand, 3),
        Err(DomainError::PriceOverflow {
            unit_price: u64::MAX / 2,
            quantity: 3
        })
    );

    // Fits in u64 but not in a stored balance.
    let stand = make_stand(1, 2, StandCategory::Food, u64::MAX / 2, 10);
    assert!(quote_purchase(&stand, 2).is_err());
}
