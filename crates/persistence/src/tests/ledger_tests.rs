// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Conditional balance updates.

use super::{create_test_fixture, write};
use crate::PersistenceError;

#[test]
fn test_debit_reduces_balance() {
    let mut fx = create_test_fixture();
    let parent_id = fx.parent_id;

    write(&mut fx.persistence, |tx| tx.debit(parent_id, 30)).unwrap();

    let parent = fx.persistence.read(|tx| tx.get_user(parent_id)).unwrap().unwrap();
    assert_eq!(parent.balance, 70);
}

#[test]
fn test_debit_of_exact_balance_reaches_zero() {
    let mut fx = create_test_fixture();
    let student_id = fx.student_id;

    write(&mut fx.persistence, |tx| tx.debit(student_id, 50)).unwrap();

    let student = fx.persistence.read(|tx| tx.get_user(student_id)).unwrap().unwrap();
    assert_eq!(student.balance, 0);
}

#[test]
fn test_debit_beyond_balance_is_rejected_and_leaves_balance() {
    let mut fx = create_test_fixture();
    let student_id = fx.student_id;

    let result = write(&mut fx.persistence, |tx| tx.debit(student_id, 51));
    assert_eq!(
        result,
        Err(PersistenceError::InsufficientBalance {
            user_id: student_id,
            amount: 51
        })
    );

    let student = fx.persistence.read(|tx| tx.get_user(student_id)).unwrap().unwrap();
    assert_eq!(student.balance, 50);
}

#[test]
fn test_debit_unknown_user_is_not_found() {
    let mut fx = create_test_fixture();
    let result = write(&mut fx.persistence, |tx| tx.debit(424_242, 1));
    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
}

#[test]
fn test_credit_rejects_overflow() {
    let mut fx = create_test_fixture();
    let parent_id = fx.parent_id;

    let result = write(&mut fx.persistence, |tx| {
        tx.credit(parent_id, u64::try_from(i64::MAX).unwrap())
    });
    assert!(matches!(
        result,
        Err(PersistenceError::BalanceOverflow { .. })
    ));
}

#[test]
fn test_credit_rejects_amount_outside_storage_range() {
    let mut fx = create_test_fixture();
    let parent_id = fx.parent_id;

    let result = write(&mut fx.persistence, |tx| tx.credit(parent_id, u64::MAX));
    assert!(result.is_err());
}

#[test]
fn test_transfer_conserves_total() {
    let mut fx = create_test_fixture();
    let (parent_id, holder_id) = (fx.parent_id, fx.holder_id);

    let before = fx.persistence.read(|tx| tx.total_balance()).unwrap();
    write(&mut fx.persistence, |tx| tx.transfer(parent_id, holder_id, 40)).unwrap();
    let after = fx.persistence.read(|tx| tx.total_balance()).unwrap();

    assert_eq!(before, after);
    let holder = fx.persistence.read(|tx| tx.get_user(holder_id)).unwrap().unwrap();
    assert_eq!(holder.balance, 40);
}

#[test]
fn test_top_up_credits_once_per_reference() {
    let mut fx = create_test_fixture();
    let parent_id = fx.parent_id;

    write(&mut fx.persistence, |tx| tx.record_top_up(parent_id, 25, "pay-001")).unwrap();
    let replay = write(&mut fx.persistence, |tx| tx.record_top_up(parent_id, 25, "pay-001"));
    assert!(matches!(replay, Err(PersistenceError::Duplicate(_))));

    let parent = fx.persistence.read(|tx| tx.get_user(parent_id)).unwrap().unwrap();
    assert_eq!(parent.balance, 125);
}
