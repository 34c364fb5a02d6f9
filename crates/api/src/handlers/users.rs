// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Accounts, credentials and balance movements.

use kermesse_domain::{
    Ineligibility, User, UserRole, require_balance, validate_amount, validate_email,
    validate_name,
};
use kermesse_persistence::{NewUser, Persistence, PersistenceError, UserCredentials};
use tracing::info;

use super::require_found;
use crate::auth::{AuthenticatedActor, AuthenticationService};
use crate::error::{ApiError, translate_domain_error};
use crate::password_policy::{AccountIdentity, PasswordPolicy};
use crate::request_response::{
    ChangePasswordRequest, InviteChildRequest, InviteChildResponse, LoginRequest,
    RegisterRequest, SendJetonRequest, SendJetonResponse, TopUpRequest, TopUpResponse,
};

fn email_taken(email: &str) -> ApiError {
    ApiError::Conflict {
        resource_type: String::from("User"),
        message: format!("Email '{email}' is already registered"),
    }
}

/// Registers a new account.
///
/// Students cannot register themselves; a parent invites them.
///
/// # Errors
///
/// Returns an error if:
/// - The role is `STUDENT`
/// - The name, email or password is invalid
/// - The email is already registered
pub fn register(persistence: &mut Persistence, request: RegisterRequest) -> Result<User, ApiError> {
    if request.role == UserRole::Student {
        return Err(ApiError::InvalidInput {
            field: String::from("role"),
            message: String::from("Students are invited by their parent"),
        });
    }

    validate_name("name", &request.name).map_err(translate_domain_error)?;
    validate_email(&request.email).map_err(translate_domain_error)?;
    PasswordPolicy::default().validate(
        &request.password,
        AccountIdentity {
            email: &request.email,
            name: &request.name,
        },
    )?;

    let password_hash: String = AuthenticationService::hash_password(&request.password)?;

    let user: User = persistence.immediate_transaction(|tx| -> Result<User, ApiError> {
        if tx.email_exists(&request.email)? {
            return Err(email_taken(&request.email));
        }

        let user_id: i64 = tx.create_user(&NewUser {
            parent_id: None,
            name: &request.name,
            email: &request.email,
            password_hash: &password_hash,
            role: request.role,
        })?;

        require_found(tx.get_user(user_id)?, "User", user_id)
    })?;

    info!(user_id = user.user_id, role = %user.role, "User registered");
    Ok(user)
}

/// Checks credentials and returns the matching user.
///
/// # Errors
///
/// Returns `ApiError::AuthenticationFailed` if they do not match.
pub fn login(persistence: &mut Persistence, request: &LoginRequest) -> Result<User, ApiError> {
    let user: User =
        AuthenticationService::verify_credentials(persistence, &request.email, &request.password)?;
    info!(user_id = user.user_id, "User logged in");
    Ok(user)
}

/// Returns the actor's own account.
///
/// # Errors
///
/// Returns an error if the account no longer exists.
pub fn me(persistence: &mut Persistence, actor: &AuthenticatedActor) -> Result<User, ApiError> {
    let user: Option<User> = persistence.read(|tx| tx.get_user(actor.id))?;
    require_found(user, "User", actor.id)
}

/// Changes the actor's password after checking the current one.
///
/// # Errors
///
/// Returns an error if the current password is wrong or the new one
/// violates the password policy.
pub fn change_password(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &ChangePasswordRequest,
) -> Result<(), ApiError> {
    let credentials: UserCredentials =
        require_found(persistence.read(|tx| tx.get_credentials(actor.id))?, "User", actor.id)?;

    if !AuthenticationService::verify_password(
        &request.current_password,
        &credentials.password_hash,
    )? {
        return Err(ApiError::AuthenticationFailed {
            reason: String::from("Current password is incorrect"),
        });
    }

    PasswordPolicy::default().validate(
        &request.new_password,
        AccountIdentity {
            email: &credentials.user.email,
            name: &credentials.user.name,
        },
    )?;

    let password_hash: String = AuthenticationService::hash_password(&request.new_password)?;
    persistence.immediate_transaction(|tx| tx.update_password_hash(actor.id, &password_hash))?;

    info!(user_id = actor.id, "Password changed");
    Ok(())
}

/// Lists the acting parent's children.
///
/// # Errors
///
/// Returns `Forbidden` unless the actor is a parent.
pub fn list_students(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<Vec<User>, ApiError> {
    actor.require_role("list students", &[UserRole::Parent])?;
    Ok(persistence.read(|tx| tx.list_children(actor.id))?)
}

/// Creates a student account owned by the acting parent.
///
/// A random temporary password is generated and returned once.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not a parent
/// - The name or email is invalid
/// - The email is already registered
pub fn invite_child(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: InviteChildRequest,
) -> Result<InviteChildResponse, ApiError> {
    actor.require_role("invite a child", &[UserRole::Parent])?;

    validate_name("name", &request.name).map_err(translate_domain_error)?;
    validate_email(&request.email).map_err(translate_domain_error)?;

    let temporary_password: String = format!("Kx{:016x}", rand::random::<u64>());
    let password_hash: String = AuthenticationService::hash_password(&temporary_password)?;

    let student: User = persistence.immediate_transaction(|tx| -> Result<User, ApiError> {
        if tx.email_exists(&request.email)? {
            return Err(email_taken(&request.email));
        }

        let user_id: i64 = tx.create_user(&NewUser {
            parent_id: Some(actor.id),
            name: &request.name,
            email: &request.email,
            password_hash: &password_hash,
            role: UserRole::Student,
        })?;

        require_found(tx.get_user(user_id)?, "User", user_id)
    })?;

    info!(
        parent_id = actor.id,
        student_id = student.user_id,
        "Student invited"
    );

    Ok(InviteChildResponse {
        student,
        temporary_password,
    })
}

/// Moves balance from the acting parent to one of their children.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not a parent
/// - The amount is zero
/// - The student does not exist or is not the actor's child
/// - The parent's balance does not cover the amount
pub fn send_jeton(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &SendJetonRequest,
) -> Result<SendJetonResponse, ApiError> {
    actor.require_role("send jetons", &[UserRole::Parent])?;
    validate_amount("amount", request.amount).map_err(translate_domain_error)?;

    let response = persistence.immediate_transaction(|tx| -> Result<SendJetonResponse, ApiError> {
        let student: User =
            require_found(tx.get_user(request.student_id)?, "User", request.student_id)?;
        if !student.is_child_of(actor.id) {
            return Err(Ineligibility::NotOwner {
                resource: "student",
                resource_id: student.user_id,
                actor_id: actor.id,
            }
            .into());
        }

        let parent: User = require_found(tx.get_user(actor.id)?, "User", actor.id)?;
        require_balance(&parent, request.amount)?;

        tx.transfer(parent.user_id, student.user_id, request.amount)?;

        Ok(SendJetonResponse {
            parent_balance: require_found(tx.get_user(parent.user_id)?, "User", parent.user_id)?
                .balance,
            student_balance: require_found(tx.get_user(student.user_id)?, "User", student.user_id)?
                .balance,
        })
    })?;

    info!(
        parent_id = actor.id,
        student_id = request.student_id,
        amount = request.amount,
        "Jetons sent"
    );
    Ok(response)
}

/// Applies an externally confirmed payment.
///
/// Called by the payment collaborator once the provider confirmed the
/// payment; the reference makes redelivery a `Conflict` instead of a
/// second credit.
///
/// # Errors
///
/// Returns an error if:
/// - The amount is zero or the reference is empty
/// - The user does not exist
/// - The reference was already applied
pub fn top_up(
    persistence: &mut Persistence,
    request: &TopUpRequest,
) -> Result<TopUpResponse, ApiError> {
    validate_amount("amount", request.amount).map_err(translate_domain_error)?;
    validate_name("reference", &request.reference).map_err(translate_domain_error)?;

    let response = persistence.immediate_transaction(|tx| -> Result<TopUpResponse, ApiError> {
        require_found(tx.get_user(request.user_id)?, "User", request.user_id)?;

        let top_up_id: i64 = tx
            .record_top_up(request.user_id, request.amount, &request.reference)
            .map_err(|e| match e {
                PersistenceError::Duplicate(_) => ApiError::Conflict {
                    resource_type: String::from("Payment"),
                    message: format!("Payment '{}' was already applied", request.reference),
                },
                other => ApiError::from(other),
            })?;

        let user: User = require_found(tx.get_user(request.user_id)?, "User", request.user_id)?;
        Ok(TopUpResponse {
            top_up_id,
            user_id: user.user_id,
            balance: user.balance,
        })
    })?;

    info!(
        user_id = request.user_id,
        amount = request.amount,
        reference = %request.reference,
        "Top-up applied"
    );
    Ok(response)
}
