use std::collections::BTreeSet;

use tracing::{error, info};
use uuid::Uuid;

use crate::{
    db::RepositoryError,
    models::{
        document::{Document, DocumentStatus, DocumentType},
        user::UserRole,
        vehicle::VehicleStatus,
    },
    state::AppState,
};

/// Document types that must all be verified before a user may drive.
pub const REQUIRED_DOCUMENTS: [DocumentType; 3] = [
    DocumentType::DriverLicense,
    DocumentType::VehicleRc,
    DocumentType::VehicleInsurance,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Verify,
    Reject,
}

pub fn has_required_documents(documents: &[Document]) -> bool {
    REQUIRED_DOCUMENTS.iter().all(|required| {
        documents
            .iter()
            .any(|d| d.doc_type == *required && d.status == DocumentStatus::Verified)
    })
}

/// Roles after an upload: a user who does not drive yet waits for review.
pub fn roles_after_upload(roles: &BTreeSet<UserRole>) -> Option<BTreeSet<UserRole>> {
    if roles.contains(&UserRole::Driver) || roles.contains(&UserRole::PendingDriver) {
        return None;
    }
    let mut next = roles.clone();
    next.remove(&UserRole::Rider);
    next.insert(UserRole::PendingDriver);
    Some(next)
}

/// Roles after promotion. `None` when the user already holds exactly these.
pub fn roles_after_promotion(roles: &BTreeSet<UserRole>) -> Option<BTreeSet<UserRole>> {
    let mut next = roles.clone();
    next.remove(&UserRole::PendingDriver);
    next.insert(UserRole::Driver);
    (next != *roles).then_some(next)
}

/// Roles after a rejection: a pending driver goes back to riding.
pub fn roles_after_rejection(roles: &BTreeSet<UserRole>) -> Option<BTreeSet<UserRole>> {
    if !roles.contains(&UserRole::PendingDriver) {
        return None;
    }
    let mut next = roles.clone();
    next.remove(&UserRole::PendingDriver);
    next.insert(UserRole::Rider);
    Some(next)
}

/// Applies an admin decision to a document and then adjusts the owner's
/// roles. The document write and the role write are independent; a failure
/// in the second is logged and does not undo the first.
pub async fn review_document(
    state: &AppState,
    document_id: Uuid,
    action: ReviewAction,
) -> Result<Option<Document>, RepositoryError> {
    let status = match action {
        ReviewAction::Verify => DocumentStatus::Verified,
        ReviewAction::Reject => DocumentStatus::Rejected,
    };

    let Some(document) = state.documents.set_document_status(document_id, status).await? else {
        return Ok(None);
    };

    let outcome = match action {
        ReviewAction::Verify => promote_if_complete(state, document.owner).await,
        ReviewAction::Reject => revert_pending(state, document.owner).await,
    };
    if let Err(e) = outcome {
        error!(user_id = %document.owner, "Role update after document review failed: {:?}", e);
    }

    Ok(Some(document))
}

async fn promote_if_complete(state: &AppState, user_id: Uuid) -> Result<(), RepositoryError> {
    let Some(user) = state.users.find_user_by_id(user_id).await? else {
        return Ok(());
    };

    let documents = state.documents.find_documents_by_owner(user_id).await?;
    if !has_required_documents(&documents) {
        return Ok(());
    }

    if let Some(roles) = roles_after_promotion(&user.role) {
        state.users.set_user_roles(user_id, &roles).await?;
        info!(%user_id, "User promoted to driver");
    }

    if let Some(vehicle) = state.vehicles.find_vehicle_by_owner(user_id).await? {
        if vehicle.status == VehicleStatus::Pending {
            state
                .vehicles
                .set_vehicle_status(vehicle.id, VehicleStatus::Active)
                .await?;
        }
    }

    Ok(())
}

async fn revert_pending(state: &AppState, user_id: Uuid) -> Result<(), RepositoryError> {
    let Some(user) = state.users.find_user_by_id(user_id).await? else {
        return Ok(());
    };

    if let Some(roles) = roles_after_rejection(&user.role) {
        state.users.set_user_roles(user_id, &roles).await?;
        info!(%user_id, "Pending driver reverted to rider");
    }

    Ok(())
}
