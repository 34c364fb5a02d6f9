// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod filter_tests;
mod initialization_tests;
mod ledger_tests;
mod ticket_tests;

use crate::{NewStand, NewTombola, NewUser, Persistence, PersistenceError, StoreTransaction};
use kermesse_domain::{StandCategory, UserRole};

/// Runs `f` in an immediate transaction with `PersistenceError` as the error type.
pub fn write<T>(
    persistence: &mut Persistence,
    f: impl FnOnce(&mut StoreTransaction<'_>) -> Result<T, PersistenceError>,
) -> Result<T, PersistenceError> {
    persistence.immediate_transaction(f)
}

pub fn create_test_user(
    tx: &mut StoreTransaction<'_>,
    email: &str,
    role: UserRole,
    parent_id: Option<i64>,
) -> i64 {
    tx.create_user(&NewUser {
        parent_id,
        name: "Test User",
        email,
        password_hash: "not-a-real-hash",
        role,
    })
    .unwrap()
}

pub fn create_test_stand(
    tx: &mut StoreTransaction<'_>,
    holder_id: i64,
    category: StandCategory,
    price: u64,
    stock: u64,
) -> i64 {
    tx.create_stand(&NewStand {
        holder_id,
        name: "Test Stand",
        description: "",
        category,
        price,
        stock,
    })
    .unwrap()
}

pub fn create_test_tombola(tx: &mut StoreTransaction<'_>, kermesse_id: i64, price: u64) -> i64 {
    tx.create_tombola(&NewTombola {
        kermesse_id,
        name: "Big Draw",
        prize: "Bicycle",
        price,
    })
    .unwrap()
}

/// A small populated kermesse.
pub struct TestFixture {
    pub persistence: Persistence,
    pub organizer_id: i64,
    pub parent_id: i64,
    pub student_id: i64,
    pub holder_id: i64,
    pub kermesse_id: i64,
    pub stand_id: i64,
}

/// Seeds an organizer, a parent with 100 and their student child with 50,
/// and a food stand (price 5, stock 10) linked to a running kermesse the
/// parent and student are enrolled in.
pub fn create_test_fixture() -> TestFixture {
    let mut persistence = Persistence::new_in_memory().unwrap();

    let (organizer_id, parent_id, student_id, holder_id, kermesse_id, stand_id) =
        write(&mut persistence, |tx| {
            let organizer_id = create_test_user(tx, "org@example.com", UserRole::Organizer, None);
            let parent_id = create_test_user(tx, "parent@example.com", UserRole::Parent, None);
            let student_id = create_test_user(
                tx,
                "student@example.com",
                UserRole::Student,
                Some(parent_id),
            );
            let holder_id = create_test_user(tx, "holder@example.com", UserRole::StandHolder, None);

            tx.credit(parent_id, 100)?;
            tx.credit(student_id, 50)?;

            let kermesse_id = tx.create_kermesse(organizer_id, "Spring Fair", "")?;
            let stand_id = create_test_stand(tx, holder_id, StandCategory::Food, 5, 10);
            tx.link_stand(kermesse_id, stand_id)?;
            tx.link_user(kermesse_id, parent_id)?;
            tx.link_user(kermesse_id, student_id)?;

            Ok((
                organizer_id,
                parent_id,
                student_id,
                holder_id,
                kermesse_id,
                stand_id,
            ))
        })
        .unwrap();

    TestFixture {
        persistence,
        organizer_id,
        parent_id,
        student_id,
        holder_id,
        kermesse_id,
        stand_id,
    }
}
