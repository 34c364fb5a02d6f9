// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization context.
//!
//! Token issuance and verification live outside this crate. What arrives
//! here is a claimed `{actor_id, role}` pair; [`AuthenticationService`]
//! checks it against the store before any orchestrator runs, and every
//! orchestrator takes the resulting [`AuthenticatedActor`] explicitly.

use kermesse_domain::{Ineligibility, User, UserRole, require_role};
use kermesse_persistence::{ActorScope, Persistence, UserCredentials};
use tracing::{debug, warn};

use crate::error::ApiError;

#[cfg(not(test))]
const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const BCRYPT_COST: u32 = 4;

/// A verified actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The acting user's identifier.
    pub id: i64,
    /// The acting user's role.
    pub role: UserRole,
}

impl AuthenticatedActor {
    /// Creates an actor context.
    ///
    /// Callers outside tests should obtain actors through
    /// [`AuthenticationService::authenticate`].
    #[must_use]
    pub const fn new(id: i64, role: UserRole) -> Self {
        Self { id, role }
    }

    /// Returns the listing scope for this actor.
    #[must_use]
    pub const fn scope(&self) -> ActorScope {
        match self.role {
            UserRole::Organizer => ActorScope::Organizer(self.id),
            UserRole::StandHolder => ActorScope::StandHolder(self.id),
            UserRole::Student => ActorScope::Student(self.id),
            UserRole::Parent => ActorScope::Parent(self.id),
        }
    }

    /// Requires one of `allowed` roles.
    ///
    /// # Errors
    ///
    /// Returns `Ineligibility::RoleNotPermitted` otherwise.
    pub fn require_role(
        &self,
        action: &'static str,
        allowed: &[UserRole],
    ) -> Result<(), Ineligibility> {
        require_role(action, self.role, allowed)
    }
}

/// Authentication service.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Verifies a claimed actor context against the store.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The persistence layer
    /// * `actor_id` - The claimed user id
    /// * `role` - The claimed role
    ///
    /// # Errors
    ///
    /// Returns `ApiError::AuthenticationFailed` if the user does not exist
    /// or holds a different role.
    pub fn authenticate(
        persistence: &mut Persistence,
        actor_id: i64,
        role: UserRole,
    ) -> Result<AuthenticatedActor, ApiError> {
        let user: Option<User> = persistence.read(|tx| tx.get_user(actor_id))?;

        match user {
            Some(user) if user.role == role => Ok(AuthenticatedActor::new(user.user_id, role)),
            Some(user) => {
                warn!(
                    actor_id,
                    claimed = %role,
                    actual = %user.role,
                    "Actor role mismatch"
                );
                Err(ApiError::AuthenticationFailed {
                    reason: String::from("Role does not match"),
                })
            }
            None => {
                debug!(actor_id, "Unknown actor");
                Err(ApiError::AuthenticationFailed {
                    reason: String::from("Unknown actor"),
                })
            }
        }
    }

    /// Checks an email and password pair.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::AuthenticationFailed` if the email is unknown or
    /// the password does not match.
    pub fn verify_credentials(
        persistence: &mut Persistence,
        email: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let credentials: UserCredentials = persistence
            .read(|tx| tx.get_credentials_by_email(email))?
            .ok_or_else(|| ApiError::AuthenticationFailed {
                reason: String::from("Invalid email or password"),
            })?;

        if Self::verify_password(password, &credentials.password_hash)? {
            Ok(credentials.user)
        } else {
            debug!(email, "Password mismatch");
            Err(ApiError::AuthenticationFailed {
                reason: String::from("Invalid email or password"),
            })
        }
    }

    /// Hashes a password for storage.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if hashing fails.
    pub fn hash_password(password: &str) -> Result<String, ApiError> {
        bcrypt::hash(password, BCRYPT_COST).map_err(|e| ApiError::Internal {
            message: format!("Failed to hash password: {e}"),
        })
    }

    /// Checks a password against a stored hash.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if the stored hash is malformed.
    pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, ApiError> {
        bcrypt::verify(password, password_hash).map_err(|e| ApiError::Internal {
            message: format!("Failed to verify password: {e}"),
        })
    }
}
