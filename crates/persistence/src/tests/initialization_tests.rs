// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{create_test_user, write};
use crate::{Persistence, PersistenceError};
use kermesse_domain::UserRole;

#[test]
fn test_in_memory_databases_are_isolated() {
    let mut first = Persistence::new_in_memory().unwrap();
    let mut second = Persistence::new_in_memory().unwrap();

    write(&mut first, |tx| {
        create_test_user(tx, "a@example.com", UserRole::Student, None);
        Ok(())
    })
    .unwrap();

    let exists: bool = second
        .read(|tx| tx.email_exists("a@example.com"))
        .unwrap();
    assert!(!exists);
}

#[test]
fn test_foreign_keys_are_enforced() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    persistence.verify_foreign_key_enforcement().unwrap();

    let result = write(&mut persistence, |tx| tx.create_kermesse(9_999, "Orphan", ""));
    assert!(matches!(result, Err(PersistenceError::DatabaseError(_))));
}

#[test]
fn test_file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kermesse.db");

    let user_id = {
        let mut persistence = Persistence::new_with_file(&path).unwrap();
        write(&mut persistence, |tx| {
            Ok(create_test_user(tx, "keep@example.com", UserRole::Parent, None))
        })
        .unwrap()
    };

    let mut reopened = Persistence::new_with_file(&path).unwrap();
    let user = reopened.read(|tx| tx.get_user(user_id)).unwrap().unwrap();
    assert_eq!(user.email, "keep@example.com");
    assert_eq!(user.balance, 0);
}

#[test]
fn test_duplicate_email_is_reported() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    write(&mut persistence, |tx| {
        create_test_user(tx, "dup@example.com", UserRole::Parent, None);
        Ok(())
    })
    .unwrap();

    let result = write(&mut persistence, |tx| {
        tx.create_user(&crate::NewUser {
            parent_id: None,
            name: "Again",
            email: "dup@example.com",
            password_hash: "x",
            role: UserRole::Parent,
        })
    });
    assert!(matches!(result, Err(PersistenceError::Duplicate(_))));
}
