// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    DomainError, validate_amount, validate_email, validate_kermesse_fields, validate_name,
    validate_points, validate_stand_fields, validate_tombola_fields,
};

#[test]
fn test_blank_names_are_rejected() {
    assert!(matches!(
        validate_name("kermesse name", "   "),
        Err(DomainError::InvalidName { field: "kermesse name", .. })
    ));
    assert!(validate_name("kermesse name", "Spring Fair").is_ok());
}

#[test]
fn test_overlong_names_are_rejected() {
    let long: String = "x".repeat(121);
    assert!(validate_name("stand name", &long).is_err());
}

#[test]
fn test_email_shape() {
    assert!(validate_email("parent@school.org").is_ok());
    for bad in [
        "",
        "parent",
        "@school.org",
        "parent@school",
        "a@b@c.org",
        "p arent@school.org",
        "parent@.org",
    ] {
        assert!(
            matches!(validate_email(bad), Err(DomainError::InvalidEmail(_))),
            "{bad} should be rejected"
        );
    }
}

#[test]
fn test_amounts_must_be_positive_and_storable() {
    assert!(validate_amount("amount", 1).is_ok());
    assert!(matches!(
        validate_amount("amount", 0),
        Err(DomainError::InvalidAmount { field: "amount", .. })
    ));
    assert!(validate_amount("amount", u64::MAX).is_err());
}

#[test]
fn test_stand_fields_allow_free_stands() {
    assert!(validate_stand_fields("Ring toss", "", 0, 0).is_ok());
    assert!(validate_stand_fields("", "", 0, 0).is_err());
    assert!(validate_stand_fields("Ring toss", "", u64::MAX, 0).is_err());
}

#[test]
fn test_tombola_fields_require_priced_tickets() {
    assert!(validate_tombola_fields("Raffle", "Bicycle", 10).is_ok());
    assert!(validate_tombola_fields("Raffle", "", 10).is_err());
    assert!(validate_tombola_fields("Raffle", "Bicycle", 0).is_err());
}

#[test]
fn test_kermesse_fields() {
    assert!(validate_kermesse_fields("Spring Fair", "").is_ok());
    assert!(validate_kermesse_fields("Spring Fair", &"d".repeat(2001)).is_err());
}

#[test]
fn test_points_must_fit_storage() {
    assert!(validate_points(250).is_ok());
    assert!(validate_points(u32::MAX).is_err());
}
