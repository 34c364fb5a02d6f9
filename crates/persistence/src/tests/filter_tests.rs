// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Role-scoped listing filters.

use super::{create_test_fixture, create_test_stand, create_test_user, write};
use crate::{ActorScope, KermesseFilter, NewParticipation, ParticipationFilter, StandFilter};
use kermesse_domain::{LifecycleStatus, StandCategory, UserRole};

#[test]
fn test_kermesse_listing_by_scope() {
    let mut fx = create_test_fixture();
    let (organizer_id, student_id, parent_id, holder_id, kermesse_id) = (
        fx.organizer_id,
        fx.student_id,
        fx.parent_id,
        fx.holder_id,
        fx.kermesse_id,
    );

    let (other_organizer, outsider) = write(&mut fx.persistence, |tx| {
        let other_organizer = create_test_user(tx, "org2@example.com", UserRole::Organizer, None);
        let outsider = create_test_user(tx, "out@example.com", UserRole::Student, None);
        tx.create_kermesse(other_organizer, "Autumn Fair", "")?;
        Ok((other_organizer, outsider))
    })
    .unwrap();

    let mut ids_for = |scope: ActorScope| -> Vec<i64> {
        fx.persistence
            .read(|tx| tx.list_kermesses(&KermesseFilter { scope }))
            .unwrap()
            .into_iter()
            .map(|k| k.kermesse_id)
            .collect()
    };

    assert_eq!(ids_for(ActorScope::All).len(), 2);
    assert_eq!(ids_for(ActorScope::Organizer(organizer_id)), vec![kermesse_id]);
    assert_eq!(ids_for(ActorScope::Organizer(other_organizer)).len(), 1);
    assert_eq!(ids_for(ActorScope::Student(student_id)), vec![kermesse_id]);
    assert_eq!(ids_for(ActorScope::Parent(parent_id)), vec![kermesse_id]);
    assert_eq!(ids_for(ActorScope::StandHolder(holder_id)), vec![kermesse_id]);
    assert!(ids_for(ActorScope::Student(outsider)).is_empty());
}

#[test]
fn test_ready_stands_exclude_running_links() {
    let mut fx = create_test_fixture();
    let (stand_id, kermesse_id) = (fx.stand_id, fx.kermesse_id);

    let free_stand = write(&mut fx.persistence, |tx| {
        let holder = create_test_user(tx, "holder2@example.com", UserRole::StandHolder, None);
        Ok(create_test_stand(tx, holder, StandCategory::Game, 3, 0))
    })
    .unwrap();

    let ready: Vec<i64> = fx
        .persistence
        .read(|tx| {
            tx.list_stands(&StandFilter {
                kermesse_id: None,
                ready_only: true,
            })
        })
        .unwrap()
        .into_iter()
        .map(|s| s.stand_id)
        .collect();
    assert_eq!(ready, vec![free_stand]);

    write(&mut fx.persistence, |tx| tx.finish_kermesse(kermesse_id)).unwrap();

    let ready_after: Vec<i64> = fx
        .persistence
        .read(|tx| {
            tx.list_stands(&StandFilter {
                kermesse_id: None,
                ready_only: true,
            })
        })
        .unwrap()
        .into_iter()
        .map(|s| s.stand_id)
        .collect();
    assert_eq!(ready_after, vec![stand_id, free_stand]);
}

#[test]
fn test_stands_of_kermesse() {
    let mut fx = create_test_fixture();
    let (stand_id, kermesse_id) = (fx.stand_id, fx.kermesse_id);

    let stands = fx
        .persistence
        .read(|tx| {
            tx.list_stands(&StandFilter {
                kermesse_id: Some(kermesse_id),
                ready_only: false,
            })
        })
        .unwrap();
    assert_eq!(stands.len(), 1);
    assert_eq!(stands[0].stand_id, stand_id);
}

#[test]
fn test_participation_listing_by_scope() {
    let mut fx = create_test_fixture();
    let (kermesse_id, stand_id, student_id, parent_id, holder_id) = (
        fx.kermesse_id,
        fx.stand_id,
        fx.student_id,
        fx.parent_id,
        fx.holder_id,
    );

    write(&mut fx.persistence, |tx| {
        for user_id in [student_id, parent_id] {
            tx.insert_participation(&NewParticipation {
                kermesse_id,
                stand_id,
                user_id,
                category: StandCategory::Food,
                quantity: 1,
                balance: 5,
                status: LifecycleStatus::Finished,
            })?;
        }
        Ok(())
    })
    .unwrap();

    let mut count_for = |scope: ActorScope| -> usize {
        fx.persistence
            .read(|tx| {
                tx.list_participations(&ParticipationFilter {
                    scope,
                    kermesse_id: Some(kermesse_id),
                })
            })
            .unwrap()
            .len()
    };

    assert_eq!(count_for(ActorScope::Student(student_id)), 1);
    assert_eq!(count_for(ActorScope::Parent(parent_id)), 2);
    assert_eq!(count_for(ActorScope::StandHolder(holder_id)), 2);
    assert_eq!(count_for(ActorScope::StandHolder(student_id)), 0);
}

#[test]
fn test_users_for_invitation_lists_unlinked_students() {
    let mut fx = create_test_fixture();
    let kermesse_id = fx.kermesse_id;

    let outsider = write(&mut fx.persistence, |tx| {
        Ok(create_test_user(tx, "new@example.com", UserRole::Student, None))
    })
    .unwrap();

    let invitable: Vec<i64> = fx
        .persistence
        .read(|tx| tx.users_for_invitation(kermesse_id))
        .unwrap()
        .into_iter()
        .map(|u| u.user_id)
        .collect();
    assert_eq!(invitable, vec![outsider]);
}
