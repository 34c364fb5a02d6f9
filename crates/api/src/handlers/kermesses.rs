// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Kermesse lifecycle.
//!
//! A kermesse is created STARTED and moves to FINISHED exactly once.
//! Completion requires every tombola under it to be finished first, and a
//! finished kermesse refuses every further mutation.

use kermesse_domain::{
    Kermesse, KermesseStatistics, Stand, Tombola, User, UserRole, can_complete_kermesse,
    can_link_stand, can_link_user, can_mutate_under_kermesse, require_owner,
    validate_kermesse_fields,
};
use kermesse_persistence::{KermesseFilter, Persistence, StoreTransaction, TombolaFilter};
use tracing::info;

use super::require_found;
use crate::auth::AuthenticatedActor;
use crate::error::{ApiError, translate_domain_error};
use crate::request_response::{
    CreateKermesseRequest, LinkStandRequest, LinkUserRequest, LinkUserResponse,
    ModifyKermesseRequest,
};

/// Loads a kermesse and requires `actor` to be its organizer.
fn load_owned(
    tx: &mut StoreTransaction<'_>,
    actor: &AuthenticatedActor,
    kermesse_id: i64,
) -> Result<Kermesse, ApiError> {
    let kermesse: Kermesse = require_found(tx.get_kermesse(kermesse_id)?, "Kermesse", kermesse_id)?;
    require_owner("kermesse", kermesse_id, kermesse.organizer_id, actor.id)?;
    Ok(kermesse)
}

/// Creates a kermesse owned by the acting organizer.
///
/// # Errors
///
/// Returns an error if the actor is not an organizer or a field is invalid.
pub fn create_kermesse(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: CreateKermesseRequest,
) -> Result<Kermesse, ApiError> {
    actor.require_role("create a kermesse", &[UserRole::Organizer])?;
    validate_kermesse_fields(&request.name, &request.description)
        .map_err(translate_domain_error)?;

    let kermesse: Kermesse = persistence.immediate_transaction(|tx| -> Result<Kermesse, ApiError> {
        let kermesse_id: i64 = tx.create_kermesse(actor.id, &request.name, &request.description)?;
        require_found(tx.get_kermesse(kermesse_id)?, "Kermesse", kermesse_id)
    })?;

    info!(
        kermesse_id = kermesse.kermesse_id,
        organizer_id = actor.id,
        "Kermesse created"
    );
    Ok(kermesse)
}

/// Edits a running kermesse.
///
/// # Errors
///
/// Returns an error if:
/// - The kermesse does not exist
/// - The actor is not its organizer
/// - It is finished
/// - A field is invalid
pub fn modify_kermesse(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    kermesse_id: i64,
    request: ModifyKermesseRequest,
) -> Result<Kermesse, ApiError> {
    let kermesse: Kermesse = persistence.immediate_transaction(|tx| -> Result<Kermesse, ApiError> {
        let current: Kermesse = load_owned(tx, actor, kermesse_id)?;
        can_mutate_under_kermesse(&current)?;

        let name: &str = request.name.as_deref().unwrap_or(&current.name);
        let description: &str = request.description.as_deref().unwrap_or(&current.description);
        validate_kermesse_fields(name, description).map_err(translate_domain_error)?;

        tx.update_kermesse(kermesse_id, name, description)?;
        require_found(tx.get_kermesse(kermesse_id)?, "Kermesse", kermesse_id)
    })?;

    info!(kermesse_id, "Kermesse modified");
    Ok(kermesse)
}

/// Completes a kermesse.
///
/// This function:
/// - Verifies the actor organizes the kermesse
/// - Requires the kermesse to be running with no running tombola
/// - Flips the status to FINISHED with a conditional update
///
/// # Errors
///
/// Returns an error if:
/// - The kermesse does not exist
/// - The actor is not its organizer
/// - It is already finished, or a tombola is still running
pub fn complete_kermesse(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    kermesse_id: i64,
) -> Result<Kermesse, ApiError> {
    let kermesse: Kermesse = persistence.immediate_transaction(|tx| -> Result<Kermesse, ApiError> {
        let current: Kermesse = load_owned(tx, actor, kermesse_id)?;
        let tombolas: Vec<Tombola> = tx.list_tombolas(&TombolaFilter {
            kermesse_id: Some(kermesse_id),
        })?;
        can_complete_kermesse(&current, &tombolas)?;

        tx.finish_kermesse(kermesse_id)?;
        require_found(tx.get_kermesse(kermesse_id)?, "Kermesse", kermesse_id)
    })?;

    info!(kermesse_id, "Kermesse completed");
    Ok(kermesse)
}

/// Enrolls a student, and their parent, in a kermesse.
///
/// Both links are written in one transaction: either both are visible
/// afterwards or neither is. A parent already enrolled is left as is.
///
/// # Errors
///
/// Returns an error if:
/// - The kermesse or user does not exist
/// - The actor is not the organizer
/// - The kermesse is finished
/// - The user is not a student or is already enrolled
pub fn link_user(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    kermesse_id: i64,
    request: LinkUserRequest,
) -> Result<LinkUserResponse, ApiError> {
    link_user_with(persistence, actor, kermesse_id, request, |_| Ok(()))
}

/// Enrollment with a step run between the student and parent inserts.
pub(crate) fn link_user_with<H>(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    kermesse_id: i64,
    request: LinkUserRequest,
    between_links: H,
) -> Result<LinkUserResponse, ApiError>
where
    H: FnOnce(&mut StoreTransaction<'_>) -> Result<(), ApiError>,
{
    let response = persistence.immediate_transaction(|tx| -> Result<LinkUserResponse, ApiError> {
        let kermesse: Kermesse = load_owned(tx, actor, kermesse_id)?;
        let student: User = require_found(tx.get_user(request.user_id)?, "User", request.user_id)?;
        let already_linked: bool = tx.is_user_linked(kermesse_id, student.user_id)?;
        can_link_user(&kermesse, &student, already_linked)?;

        tx.link_user(kermesse_id, student.user_id)?;
        between_links(tx)?;

        if let Some(parent_id) = student.parent_id {
            tx.link_user_if_absent(kermesse_id, parent_id)?;
        }

        Ok(LinkUserResponse {
            kermesse_id,
            user_id: student.user_id,
            parent_id: student.parent_id,
        })
    })?;

    info!(
        kermesse_id,
        user_id = response.user_id,
        parent_id = ?response.parent_id,
        "User linked"
    );
    Ok(response)
}

/// Attaches a stand to a kermesse.
///
/// # Errors
///
/// Returns an error if:
/// - The kermesse or stand does not exist
/// - The actor is not the organizer
/// - The kermesse is finished
/// - The stand is already part of a running kermesse
pub fn link_stand(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    kermesse_id: i64,
    request: LinkStandRequest,
) -> Result<Kermesse, ApiError> {
    let kermesse: Kermesse = persistence.immediate_transaction(|tx| -> Result<Kermesse, ApiError> {
        let kermesse: Kermesse = load_owned(tx, actor, kermesse_id)?;
        let stand: Stand =
            require_found(tx.get_stand(request.stand_id)?, "Stand", request.stand_id)?;
        let linked: Vec<Kermesse> = tx.kermesses_for_stand(stand.stand_id)?;
        can_link_stand(&stand, &kermesse, &linked)?;

        tx.link_stand(kermesse_id, stand.stand_id)?;
        Ok(kermesse)
    })?;

    info!(kermesse_id, stand_id = request.stand_id, "Stand linked");
    Ok(kermesse)
}

/// Returns a kermesse by id.
///
/// # Errors
///
/// Returns `ResourceNotFound` if it does not exist.
pub fn get_kermesse(persistence: &mut Persistence, kermesse_id: i64) -> Result<Kermesse, ApiError> {
    let kermesse: Option<Kermesse> = persistence.read(|tx| tx.get_kermesse(kermesse_id))?;
    require_found(kermesse, "Kermesse", kermesse_id)
}

/// Lists the kermesses visible to the actor.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_kermesses(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<Vec<Kermesse>, ApiError> {
    let filter: KermesseFilter = KermesseFilter {
        scope: actor.scope(),
    };
    Ok(persistence.read(|tx| tx.list_kermesses(&filter))?)
}

/// Computes the actor's view of a kermesse's statistics.
///
/// # Errors
///
/// Returns an error if the kermesse does not exist, or the actor is an
/// organizer who does not own it.
pub fn kermesse_statistics(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    kermesse_id: i64,
) -> Result<KermesseStatistics, ApiError> {
    persistence.read(|tx| -> Result<KermesseStatistics, ApiError> {
        let kermesse: Kermesse =
            require_found(tx.get_kermesse(kermesse_id)?, "Kermesse", kermesse_id)?;
        if actor.role == UserRole::Organizer {
            require_owner("kermesse", kermesse_id, kermesse.organizer_id, actor.id)?;
        }
        Ok(tx.kermesse_statistics(kermesse_id, actor.scope())?)
    })
}

/// Lists students not yet enrolled in the kermesse.
///
/// # Errors
///
/// Returns an error if the kermesse does not exist or the actor is not
/// its organizer.
pub fn users_for_invitation(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    kermesse_id: i64,
) -> Result<Vec<User>, ApiError> {
    persistence.read(|tx| -> Result<Vec<User>, ApiError> {
        load_owned(tx, actor, kermesse_id)?;
        Ok(tx.users_for_invitation(kermesse_id)?)
    })
}
