// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Stand purchases and game outcomes.

use kermesse_domain::{LifecycleStatus, StandCategory, UserRole};

use crate::handlers::{participations, stands, users};
use crate::{
    ApiError, CreateParticipationRequest, ErrorKind, KermesseQuery, NoopNotifier,
    ParticipationReceipt, RecordOutcomeRequest, SendJetonRequest,
};

use super::helpers::{
    Fair, RecordingNotifier, balance_of, fund, register_actor, setup_fair, setup_fair_with_stand,
};

fn buy(fair: &mut Fair, quantity: Option<u32>) -> Result<ParticipationReceipt, ApiError> {
    let parent = fair.parent;
    let stand_id = fair.stand.stand_id;
    participations::create_participation(
        &mut fair.persistence,
        &NoopNotifier,
        &parent,
        CreateParticipationRequest { stand_id, quantity },
    )
}

fn total_of(fair: &mut Fair) -> u64 {
    let ids = [fair.parent.id, fair.student.id, fair.holder.id];
    ids.iter()
        .map(|id| balance_of(&mut fair.persistence, *id))
        .sum()
}

fn rule_of(err: &ApiError) -> &str {
    match err {
        ApiError::DomainRuleViolation { rule, .. } | ApiError::Forbidden { rule, .. } => rule,
        other => panic!("Expected a rule violation, got {other:?}"),
    }
}

#[test]
fn test_buying_whole_stock_moves_balance_and_empties_stand() {
    let mut fair = setup_fair();

    let receipt = buy(&mut fair, Some(2)).unwrap();

    assert_eq!(receipt.buyer_balance, 40);
    assert_eq!(receipt.stand_stock, 0);
    assert_eq!(receipt.participation.quantity, 2);
    assert_eq!(receipt.participation.balance, 60);
    assert_eq!(receipt.participation.category, StandCategory::Food);
    assert_eq!(receipt.participation.status, LifecycleStatus::Finished);
    assert_eq!(receipt.participation.kermesse_id, fair.kermesse_id);
    assert_eq!(balance_of(&mut fair.persistence, fair.holder.id), 60);
}

#[test]
fn test_purchases_conserve_total_balance() {
    let mut fair = setup_fair_with_stand(StandCategory::Drink, 7, 10);
    let before = total_of(&mut fair);

    buy(&mut fair, Some(3)).unwrap();
    buy(&mut fair, Some(1)).unwrap();
    let _ = buy(&mut fair, Some(50));

    assert_eq!(total_of(&mut fair), before);
}

#[test]
fn test_insufficient_balance_changes_nothing() {
    let mut fair = setup_fair_with_stand(StandCategory::Food, 60, 5);

    let err = buy(&mut fair, Some(2)).unwrap_err();

    assert_eq!(rule_of(&err), "insufficient_balance");
    assert_eq!(balance_of(&mut fair.persistence, fair.parent.id), 100);
    assert_eq!(balance_of(&mut fair.persistence, fair.holder.id), 0);
    let stand = stands::get_stand(&mut fair.persistence, fair.stand.stand_id).unwrap();
    assert_eq!(stand.stock, 5);
    let parent = fair.parent;
    let listed = participations::list_participations(
        &mut fair.persistence,
        &parent,
        KermesseQuery::default(),
    )
    .unwrap();
    assert!(listed.is_empty());
}

#[test]
fn test_short_stock_is_rejected() {
    let mut fair = setup_fair();

    let err = buy(&mut fair, Some(3)).unwrap_err();

    assert_eq!(rule_of(&err), "insufficient_stock");
    assert_eq!(balance_of(&mut fair.persistence, fair.parent.id), 100);
}

#[test]
fn test_stocked_stand_requires_quantity() {
    let mut fair = setup_fair();

    let err = buy(&mut fair, None).unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "quantity"));

    let err = buy(&mut fair, Some(0)).unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "quantity"));
}

#[test]
fn test_unenrolled_buyer_is_forbidden() {
    let mut fair = setup_fair();
    let outsider = register_actor(
        &mut fair.persistence,
        "Walk In",
        "walkin@school.test",
        UserRole::Parent,
    );
    fund(&mut fair.persistence, outsider.id, 100, "pay-walkin");

    let err = participations::create_participation(
        &mut fair.persistence,
        &NoopNotifier,
        &outsider,
        CreateParticipationRequest {
            stand_id: fair.stand.stand_id,
            quantity: Some(1),
        },
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert_eq!(rule_of(&err), "not_enrolled");
    assert_eq!(balance_of(&mut fair.persistence, outsider.id), 100);
}

#[test]
fn test_stand_holder_cannot_buy() {
    let mut fair = setup_fair();

    let err = participations::create_participation(
        &mut fair.persistence,
        &NoopNotifier,
        &fair.holder,
        CreateParticipationRequest {
            stand_id: fair.stand.stand_id,
            quantity: Some(1),
        },
    )
    .unwrap_err();

    assert_eq!(rule_of(&err), "role_not_permitted");
}

#[test]
fn test_unknown_stand_is_not_found() {
    let mut fair = setup_fair();
    fair.stand.stand_id = 9_999;

    let err = buy(&mut fair, Some(1)).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_purchase_notifies_organizer_after_commit() {
    let mut fair = setup_fair();
    let notifier = RecordingNotifier::default();

    let receipt = participations::create_participation(
        &mut fair.persistence,
        &notifier,
        &fair.parent,
        CreateParticipationRequest {
            stand_id: fair.stand.stand_id,
            quantity: Some(1),
        },
    )
    .unwrap();
    let _ = participations::create_participation(
        &mut fair.persistence,
        &notifier,
        &fair.parent,
        CreateParticipationRequest {
            stand_id: fair.stand.stand_id,
            quantity: Some(5),
        },
    )
    .unwrap_err();

    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    let (organizer_id, message) = &messages[0];
    assert_eq!(*organizer_id, fair.organizer.id);
    let json: serde_json::Value = serde_json::from_str(message).unwrap();
    assert_eq!(json["event"], "participation");
    assert_eq!(
        json["participation_id"],
        receipt.participation.participation_id
    );
    assert_eq!(json["amount"], 30);
}

#[test]
fn test_game_sells_single_play_and_records_outcome_once() {
    let mut fair = setup_fair_with_stand(StandCategory::Game, 4, 0);
    users::send_jeton(
        &mut fair.persistence,
        &fair.parent,
        &SendJetonRequest {
            student_id: fair.student.id,
            amount: 10,
        },
    )
    .unwrap();
    let student = fair.student;

    let err = participations::create_participation(
        &mut fair.persistence,
        &NoopNotifier,
        &student,
        CreateParticipationRequest {
            stand_id: fair.stand.stand_id,
            quantity: Some(2),
        },
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput { .. }));

    let receipt = participations::create_participation(
        &mut fair.persistence,
        &NoopNotifier,
        &student,
        CreateParticipationRequest {
            stand_id: fair.stand.stand_id,
            quantity: None,
        },
    )
    .unwrap();
    assert_eq!(receipt.buyer_balance, 6);
    assert_eq!(receipt.participation.status, LifecycleStatus::Started);
    let participation_id = receipt.participation.participation_id;

    let err = participations::record_outcome(
        &mut fair.persistence,
        &fair.organizer,
        participation_id,
        RecordOutcomeRequest { points: 3 },
    )
    .unwrap_err();
    assert_eq!(rule_of(&err), "not_owner");

    let recorded = participations::record_outcome(
        &mut fair.persistence,
        &fair.holder,
        participation_id,
        RecordOutcomeRequest { points: 3 },
    )
    .unwrap();
    assert_eq!(recorded.points, 3);
    assert_eq!(recorded.status, LifecycleStatus::Finished);

    let err = participations::record_outcome(
        &mut fair.persistence,
        &fair.holder,
        participation_id,
        RecordOutcomeRequest { points: 9 },
    )
    .unwrap_err();
    assert_eq!(rule_of(&err), "outcome_already_recorded");
}

#[test]
fn test_food_participation_has_no_outcome() {
    let mut fair = setup_fair();
    let receipt = buy(&mut fair, Some(1)).unwrap();

    let err = participations::record_outcome(
        &mut fair.persistence,
        &fair.holder,
        receipt.participation.participation_id,
        RecordOutcomeRequest { points: 1 },
    )
    .unwrap_err();

    assert_eq!(rule_of(&err), "not_a_game");
}

#[test]
fn test_participation_listing_is_scoped() {
    let mut fair = setup_fair();
    buy(&mut fair, Some(1)).unwrap();
    let other_holder = register_actor(
        &mut fair.persistence,
        "Other Holder",
        "otherholder@school.test",
        UserRole::StandHolder,
    );

    let query = KermesseQuery {
        kermesse_id: Some(fair.kermesse_id),
    };
    let for_holder =
        participations::list_participations(&mut fair.persistence, &fair.holder, query).unwrap();
    assert_eq!(for_holder.len(), 1);

    let for_other =
        participations::list_participations(&mut fair.persistence, &other_holder, query).unwrap();
    assert!(for_other.is_empty());

    let for_student =
        participations::list_participations(&mut fair.persistence, &fair.student, query).unwrap();
    assert!(for_student.is_empty());
}
