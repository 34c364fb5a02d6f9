// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Password rules for registered and invited accounts.

use thiserror::Error;

/// bcrypt ignores everything past this many bytes.
const BCRYPT_MAX_BYTES: usize = 72;

/// Why a password was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    /// Fewer characters than the policy minimum.
    #[error("Password must be at least {min_length} characters long")]
    TooShort { min_length: usize },

    /// Longer than bcrypt can hash without truncation.
    #[error("Password must not exceed {max_bytes} bytes")]
    TooLong { max_bytes: usize },

    /// Not enough distinct character classes.
    #[error(
        "Password must mix at least {required} of: uppercase, lowercase, digit, symbol (found {found})"
    )]
    InsufficientComplexity { required: usize, found: usize },

    /// Same as an identifying field of the account.
    #[error("Password must not be the account {field}")]
    MatchesAccountField { field: &'static str },
}

/// Character classes counted towards complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Upper,
    Lower,
    Digit,
    Symbol,
}

impl CharClass {
    const ALL: [Self; 4] = [Self::Upper, Self::Lower, Self::Digit, Self::Symbol];

    fn of(c: char) -> Option<Self> {
        if c.is_uppercase() {
            Some(Self::Upper)
        } else if c.is_lowercase() {
            Some(Self::Lower)
        } else if c.is_ascii_digit() {
            Some(Self::Digit)
        } else if c.is_whitespace() {
            None
        } else {
            Some(Self::Symbol)
        }
    }
}

/// Identifying fields a password may not repeat.
#[derive(Debug, Clone, Copy)]
pub struct AccountIdentity<'a> {
    /// Login email.
    pub email: &'a str,
    /// Display name.
    pub name: &'a str,
}

/// Password policy applied on registration and password change.
#[derive(Debug, Clone, Copy)]
pub struct PasswordPolicy {
    /// Minimum length in characters.
    pub min_length: usize,
    /// Minimum number of character classes, out of four.
    pub min_classes: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            min_classes: 2,
        }
    }
}

impl PasswordPolicy {
    /// Checks `password` for the account described by `identity`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The password is shorter than `min_length` characters
    /// - The password is longer than bcrypt accepts
    /// - Fewer than `min_classes` character classes are used
    /// - The password equals the email or the name, ignoring case
    pub fn validate(
        &self,
        password: &str,
        identity: AccountIdentity<'_>,
    ) -> Result<(), PasswordPolicyError> {
        if password.chars().count() < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min_length: self.min_length,
            });
        }

        if password.len() > BCRYPT_MAX_BYTES {
            return Err(PasswordPolicyError::TooLong {
                max_bytes: BCRYPT_MAX_BYTES,
            });
        }

        let found: usize = class_count(password);
        if found < self.min_classes {
            return Err(PasswordPolicyError::InsufficientComplexity {
                required: self.min_classes,
                found,
            });
        }

        for (field, value) in [("email", identity.email), ("name", identity.name)] {
            if password.to_lowercase() == value.to_lowercase() {
                return Err(PasswordPolicyError::MatchesAccountField { field });
            }
        }

        Ok(())
    }
}

/// Number of distinct character classes in `password`.
fn class_count(password: &str) -> usize {
    let present: Vec<CharClass> = password.chars().filter_map(CharClass::of).collect();
    CharClass::ALL
        .iter()
        .filter(|class| present.contains(class))
        .count()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const ANN: AccountIdentity<'static> = AccountIdentity {
        email: "ann@example.com",
        name: "Ann",
    };

    #[test]
    fn test_accepts_two_classes() {
        let policy = PasswordPolicy::default();

        assert!(policy.validate("kermesse2026", ANN).is_ok());
        assert!(policy.validate("Tombola!", ANN).is_ok());
    }

    #[test]
    fn test_rejects_short_password() {
        assert_eq!(
            PasswordPolicy::default().validate("Ab1!", ANN),
            Err(PasswordPolicyError::TooShort { min_length: 8 })
        );
    }

    #[test]
    fn test_rejects_password_bcrypt_would_truncate() {
        let long: String = format!("Aa1{}", "x".repeat(80));
        assert_eq!(
            PasswordPolicy::default().validate(&long, ANN),
            Err(PasswordPolicyError::TooLong { max_bytes: 72 })
        );
    }

    #[test]
    fn test_rejects_single_class() {
        assert_eq!(
            PasswordPolicy::default().validate("onlylowercase", ANN),
            Err(PasswordPolicyError::InsufficientComplexity {
                required: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_rejects_email_and_name_ignoring_case() {
        let policy = PasswordPolicy::default();

        assert_eq!(
            policy.validate("Ann@Example.com", ANN),
            Err(PasswordPolicyError::MatchesAccountField { field: "email" })
        );
        assert_eq!(
            policy.validate(
                "annabelle99",
                AccountIdentity {
                    email: "ann@example.com",
                    name: "Annabelle99",
                }
            ),
            Err(PasswordPolicyError::MatchesAccountField { field: "name" })
        );
    }

    #[test]
    fn test_class_count() {
        assert_eq!(class_count("Aa1!"), 4);
        assert_eq!(class_count("Aa1"), 3);
        assert_eq!(class_count("abc!"), 2);
        assert_eq!(class_count("a b c"), 1);
        assert_eq!(class_count(""), 0);
    }
}
