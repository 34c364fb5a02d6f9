// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Stand creation, stock edits and listings.

use kermesse_domain::{StandCategory, UserRole};
use kermesse_persistence::Persistence;

use crate::handlers::stands;
use crate::{ApiError, CreateStandRequest, ErrorKind, ListStandsQuery, ModifyStandRequest};

use super::helpers::{open_stand, register_actor, setup_fair};

#[test]
fn test_game_stand_never_tracks_stock() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let holder = register_actor(
        &mut persistence,
        "Game Holder",
        "game@school.test",
        UserRole::StandHolder,
    );

    let stand = stands::create_stand(
        &mut persistence,
        &holder,
        CreateStandRequest {
            name: String::from("Ring toss"),
            description: String::new(),
            category: StandCategory::Game,
            price: 2,
            stock: 40,
        },
    )
    .unwrap();
    assert_eq!(stand.stock, 0);

    let err = stands::modify_stand(
        &mut persistence,
        &holder,
        ModifyStandRequest {
            stock: Some(5),
            ..ModifyStandRequest::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "stock"));
}

#[test]
fn test_holder_owns_a_single_stand() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let holder = register_actor(
        &mut persistence,
        "Busy Holder",
        "busy@school.test",
        UserRole::StandHolder,
    );
    open_stand(&mut persistence, &holder, StandCategory::Food, 3, 10);

    let err = stands::create_stand(
        &mut persistence,
        &holder,
        CreateStandRequest {
            name: String::from("Second"),
            description: String::new(),
            category: StandCategory::Drink,
            price: 1,
            stock: 1,
        },
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn test_only_stand_holders_create_stands() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let parent = register_actor(
        &mut persistence,
        "Parent",
        "parent-stand@school.test",
        UserRole::Parent,
    );

    let err = stands::create_stand(
        &mut persistence,
        &parent,
        CreateStandRequest {
            name: String::from("Lemonade"),
            description: String::new(),
            category: StandCategory::Drink,
            price: 1,
            stock: 5,
        },
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[test]
fn test_modify_stand_sets_stock_through_delta() {
    let mut fair = setup_fair();
    let holder = fair.holder;

    let raised = stands::modify_stand(
        &mut fair.persistence,
        &holder,
        ModifyStandRequest {
            stock: Some(9),
            price: Some(25),
            ..ModifyStandRequest::default()
        },
    )
    .unwrap();
    assert_eq!(raised.stock, 9);
    assert_eq!(raised.price, 25);

    let lowered = stands::modify_stand(
        &mut fair.persistence,
        &holder,
        ModifyStandRequest {
            stock: Some(1),
            ..ModifyStandRequest::default()
        },
    )
    .unwrap();
    assert_eq!(lowered.stock, 1);
    assert_eq!(lowered.name, fair.stand.name);
}

#[test]
fn test_own_stand_lookup() {
    let mut fair = setup_fair();

    let own = stands::get_own_stand(&mut fair.persistence, &fair.holder).unwrap();
    assert_eq!(own, fair.stand);

    let err = stands::get_own_stand(&mut fair.persistence, &fair.parent).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[test]
fn test_ready_listing_skips_linked_stands() {
    let mut fair = setup_fair();
    let free_holder = register_actor(
        &mut fair.persistence,
        "Free Holder",
        "free@school.test",
        UserRole::StandHolder,
    );
    let free = open_stand(
        &mut fair.persistence,
        &free_holder,
        StandCategory::Drink,
        1,
        3,
    );

    let ready = stands::list_stands(
        &mut fair.persistence,
        ListStandsQuery {
            kermesse_id: None,
            ready: true,
        },
    )
    .unwrap();
    let ids: Vec<i64> = ready.iter().map(|s| s.stand_id).collect();
    assert_eq!(ids, vec![free.stand_id]);

    let linked = stands::list_stands(
        &mut fair.persistence,
        ListStandsQuery {
            kermesse_id: Some(fair.kermesse_id),
            ready: false,
        },
    )
    .unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].stand_id, fair.stand.stand_id);
}
