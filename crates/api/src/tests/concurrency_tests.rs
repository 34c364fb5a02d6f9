// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Racing commands on separate connections to one database file.

use std::path::Path;
use std::sync::{Arc, Barrier};
use std::thread;

use kermesse_domain::StandCategory;
use kermesse_persistence::Persistence;

use crate::handlers::{participations, tombolas, users};
use crate::{
    ApiError, AuthenticatedActor, BuyTicketRequest, CreateParticipationRequest, ErrorKind,
    NoopNotifier, SendJetonRequest,
};

use super::helpers::{Fair, balance_of, open_tombola, setup_fair_in};

fn file_fair(path: &Path, category: StandCategory, price: u64, stock: u64) -> Fair {
    let persistence = Persistence::new_with_file(path).unwrap();
    setup_fair_in(persistence, category, price, stock)
}

/// Runs `command` on two threads at once, each with its own connection.
fn race<T, F>(path: &Path, command: F) -> Vec<Result<T, ApiError>>
where
    T: Send + 'static,
    F: Fn(&mut Persistence) -> Result<T, ApiError> + Send + Sync + 'static,
{
    let barrier = Arc::new(Barrier::new(2));
    let command = Arc::new(command);

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            let command = Arc::clone(&command);
            let path = path.to_path_buf();
            thread::spawn(move || {
                let mut persistence = Persistence::new_with_file(&path).unwrap();
                barrier.wait();
                command(&mut persistence)
            })
        })
        .collect();

    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

#[test]
fn test_concurrent_purchases_cannot_double_spend() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("double_spend.db");
    let mut fair = file_fair(&path, StandCategory::Food, 60, 5);
    let parent: AuthenticatedActor = fair.parent;
    let stand_id = fair.stand.stand_id;

    let results = race(&path, move |persistence| {
        participations::create_participation(
            persistence,
            &NoopNotifier,
            &parent,
            CreateParticipationRequest {
                stand_id,
                quantity: Some(1),
            },
        )
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let failure = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(matches!(
        failure.kind(),
        ErrorKind::BadRequest | ErrorKind::Conflict
    ));

    assert_eq!(balance_of(&mut fair.persistence, parent.id), 40);
    assert_eq!(balance_of(&mut fair.persistence, fair.holder.id), 60);
    let stand = fair
        .persistence
        .read(|tx| tx.get_stand(stand_id))
        .unwrap()
        .unwrap();
    assert_eq!(stand.stock, 4);
}

#[test]
fn test_concurrent_draws_pick_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("double_draw.db");
    let mut fair = file_fair(&path, StandCategory::Drink, 1, 1);
    let (parent, student, organizer) = (fair.parent, fair.student, fair.organizer);

    users::send_jeton(
        &mut fair.persistence,
        &parent,
        &SendJetonRequest {
            student_id: student.id,
            amount: 20,
        },
    )
    .unwrap();
    let tombola = open_tombola(&mut fair.persistence, &organizer, fair.kermesse_id, 5);
    for _ in 0..4 {
        tombolas::buy_ticket(
            &mut fair.persistence,
            &NoopNotifier,
            &student,
            BuyTicketRequest {
                tombola_id: tombola.tombola_id,
            },
        )
        .unwrap();
    }
    let tombola_id = tombola.tombola_id;

    let results = race(&path, move |persistence| {
        tombolas::finish_tombola(persistence, &NoopNotifier, &organizer, tombola_id)
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let failure = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_eq!(failure.kind(), ErrorKind::Conflict);

    let winners = fair
        .persistence
        .read(|tx| tx.count_winners(tombola_id))
        .unwrap();
    assert_eq!(winners, 1);
}

#[test]
fn test_concurrent_transfers_keep_total() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transfers.db");
    let mut fair = file_fair(&path, StandCategory::Food, 1, 1);
    let (parent, student) = (fair.parent, fair.student);

    let results = race(&path, move |persistence| {
        users::send_jeton(
            persistence,
            &parent,
            &SendJetonRequest {
                student_id: student.id,
                amount: 70,
            },
        )
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(balance_of(&mut fair.persistence, parent.id), 30);
    assert_eq!(balance_of(&mut fair.persistence, student.id), 70);
}
