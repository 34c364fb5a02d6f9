// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;

const MAX_NAME_LEN: usize = 120;
const MAX_DESCRIPTION_LEN: usize = 2000;

/// Validates a display name.
///
/// # Errors
///
/// Returns `DomainError::InvalidName` if the name is blank or too long.
pub fn validate_name(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::InvalidName {
            field,
            reason: "cannot be empty".to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::InvalidName {
            field,
            reason: format!("cannot exceed {MAX_NAME_LEN} characters"),
        });
    }

    Ok(())
}

fn validate_description(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(DomainError::InvalidName {
            field,
            reason: format!("cannot exceed {MAX_DESCRIPTION_LEN} characters"),
        });
    }
    Ok(())
}

/// Validates an email address.
///
/// Only the shape is checked: one `@` with a non-empty local part and a
/// domain containing a dot.
///
/// # Errors
///
/// Returns `DomainError::InvalidEmail` if the address is malformed.
pub fn validate_email(email: &str) -> Result<(), DomainError> {
    let invalid = || DomainError::InvalidEmail(email.to_string());

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }

    Ok(())
}

/// Validates an amount that must move money, so it must be positive.
///
/// # Errors
///
/// Returns `DomainError::InvalidAmount` for zero or amounts beyond the storable range.
pub fn validate_amount(field: &'static str, amount: u64) -> Result<(), DomainError> {
    if amount == 0 {
        return Err(DomainError::InvalidAmount {
            field,
            reason: "must be greater than zero".to_string(),
        });
    }
    validate_storable(field, amount)
}

fn validate_storable(field: &'static str, amount: u64) -> Result<(), DomainError> {
    if i64::try_from(amount).is_err() {
        return Err(DomainError::InvalidAmount {
            field,
            reason: format!("cannot exceed {}", i64::MAX),
        });
    }
    Ok(())
}

/// Validates the editable fields of a kermesse.
///
/// # Errors
///
/// Returns `DomainError::InvalidName` if a field is invalid.
pub fn validate_kermesse_fields(name: &str, description: &str) -> Result<(), DomainError> {
    validate_name("kermesse name", name)?;
    validate_description("kermesse description", description)
}

/// Validates the editable fields of a stand.
///
/// Prices may be zero (free stands), stock is bounded only by storage.
///
/// # Errors
///
/// Returns an error if any field is invalid.
pub fn validate_stand_fields(
    name: &str,
    description: &str,
    price: u64,
    stock: u64,
) -> Result<(), DomainError> {
    validate_name("stand name", name)?;
    validate_description("stand description", description)?;
    validate_storable("stand price", price)?;
    validate_storable("stand stock", stock)
}

/// Validates the editable fields of a tombola.
///
/// # Errors
///
/// Returns an error if any field is invalid.
pub fn validate_tombola_fields(name: &str, prize: &str, price: u64) -> Result<(), DomainError> {
    validate_name("tombola name", name)?;
    validate_name("tombola prize", prize)?;
    validate_amount("ticket price", price)
}

/// Validates points awarded for a game.
///
/// # Errors
///
/// Returns `DomainError::InvalidPoints` when the value exceeds the storable range.
pub fn validate_points(points: u32) -> Result<(), DomainError> {
    if i32::try_from(points).is_err() {
        return Err(DomainError::InvalidPoints(format!(
            "cannot exceed {}",
            i32::MAX
        )));
    }
    Ok(())
}
