// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{create_test_fixture, create_test_tombola, write};
use crate::{ActorScope, PersistenceError, TicketFilter};

#[test]
fn test_tickets_listed_in_sale_order() {
    let mut fx = create_test_fixture();
    let (kermesse_id, student_id) = (fx.kermesse_id, fx.student_id);

    let (tombola_id, sold) = write(&mut fx.persistence, |tx| {
        let tombola_id = create_test_tombola(tx, kermesse_id, 2);
        let first = tx.insert_ticket(tombola_id, student_id)?;
        let second = tx.insert_ticket(tombola_id, student_id)?;
        Ok((tombola_id, vec![first, second]))
    })
    .unwrap();

    let ids = fx
        .persistence
        .read(|tx| tx.ticket_ids_for_tombola(tombola_id))
        .unwrap();
    assert_eq!(ids, sold);
}

#[test]
fn test_only_one_winner_per_tombola() {
    let mut fx = create_test_fixture();
    let (kermesse_id, student_id) = (fx.kermesse_id, fx.student_id);

    let (tombola_id, first, second) = write(&mut fx.persistence, |tx| {
        let tombola_id = create_test_tombola(tx, kermesse_id, 2);
        let first = tx.insert_ticket(tombola_id, student_id)?;
        let second = tx.insert_ticket(tombola_id, student_id)?;
        Ok((tombola_id, first, second))
    })
    .unwrap();

    write(&mut fx.persistence, |tx| tx.mark_winner(tombola_id, first)).unwrap();

    let again = write(&mut fx.persistence, |tx| tx.mark_winner(tombola_id, first));
    assert!(matches!(
        again,
        Err(PersistenceError::WinnerNotRecorded { .. })
    ));

    let other = write(&mut fx.persistence, |tx| tx.mark_winner(tombola_id, second));
    assert!(matches!(other, Err(PersistenceError::Duplicate(_))));

    let winners = fx.persistence.read(|tx| tx.count_winners(tombola_id)).unwrap();
    assert_eq!(winners, 1);
}

#[test]
fn test_ticket_of_other_tombola_cannot_win() {
    let mut fx = create_test_fixture();
    let (kermesse_id, student_id) = (fx.kermesse_id, fx.student_id);

    let (tombola_a, ticket_b) = write(&mut fx.persistence, |tx| {
        let tombola_a = create_test_tombola(tx, kermesse_id, 2);
        let tombola_b = create_test_tombola(tx, kermesse_id, 3);
        let ticket_b = tx.insert_ticket(tombola_b, student_id)?;
        Ok((tombola_a, ticket_b))
    })
    .unwrap();

    let result = write(&mut fx.persistence, |tx| tx.mark_winner(tombola_a, ticket_b));
    assert!(matches!(
        result,
        Err(PersistenceError::WinnerNotRecorded { .. })
    ));
}

#[test]
fn test_ticket_listing_is_scoped() {
    let mut fx = create_test_fixture();
    let (kermesse_id, student_id, parent_id, holder_id) =
        (fx.kermesse_id, fx.student_id, fx.parent_id, fx.holder_id);

    let tombola_id = write(&mut fx.persistence, |tx| {
        let tombola_id = create_test_tombola(tx, kermesse_id, 2);
        tx.insert_ticket(tombola_id, student_id)?;
        Ok(tombola_id)
    })
    .unwrap();

    let for_parent = fx
        .persistence
        .read(|tx| {
            tx.list_tickets(&TicketFilter {
                scope: ActorScope::Parent(parent_id),
                tombola_id: Some(tombola_id),
            })
        })
        .unwrap();
    assert_eq!(for_parent.len(), 1);

    let for_holder = fx
        .persistence
        .read(|tx| {
            tx.list_tickets(&TicketFilter {
                scope: ActorScope::StandHolder(holder_id),
                tombola_id: None,
            })
        })
        .unwrap();
    assert!(for_holder.is_empty());
}
