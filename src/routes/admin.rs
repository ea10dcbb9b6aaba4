use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    models::{
        document::{DocumentStatus, ReviewDocument},
        user::User,
    },
    responses::JsonResponse,
    routes::auth::session::AdminAccess,
    services::driver_verification::{review_document, ReviewAction},
    state::AppState,
};

pub async fn handle_pending_documents(
    _admin: AdminAccess,
    State(state): State<AppState>,
) -> Response {
    let documents = match state
        .documents
        .list_documents_by_status(DocumentStatus::Pending)
        .await
    {
        Ok(documents) => documents,
        Err(e) => {
            error!("Failed to list pending documents: {:?}", e);
            return JsonResponse::server_error("Server error").into_response();
        }
    };

    let mut owners: HashMap<Uuid, Option<User>> = HashMap::new();
    let mut review = Vec::with_capacity(documents.len());
    for document in documents {
        if !owners.contains_key(&document.owner) {
            let owner = match state.users.find_user_by_id(document.owner).await {
                Ok(owner) => owner,
                Err(e) => {
                    error!("Failed to load document owner: {:?}", e);
                    return JsonResponse::server_error("Server error").into_response();
                }
            };
            owners.insert(document.owner, owner);
        }
        let owner = owners.get(&document.owner).cloned().flatten();
        review.push(ReviewDocument::new(document, owner));
    }

    Json(json!({
        "success": true,
        "documents": review
    }))
    .into_response()
}

pub async fn handle_verify_document(
    _admin: AdminAccess,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    apply_review(&state, &id, ReviewAction::Verify).await
}

pub async fn handle_reject_document(
    _admin: AdminAccess,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    apply_review(&state, &id, ReviewAction::Reject).await
}

async fn apply_review(state: &AppState, raw_id: &str, action: ReviewAction) -> Response {
    let Ok(document_id) = Uuid::parse_str(raw_id) else {
        return JsonResponse::bad_request("Invalid document ID").into_response();
    };

    match review_document(state, document_id, action).await {
        Ok(Some(document)) => {
            info!(%document_id, ?action, "Document reviewed");
            let message = match action {
                ReviewAction::Verify => "Document verified.",
                ReviewAction::Reject => "Document rejected.",
            };
            Json(json!({
                "success": true,
                "message": message,
                "document": document
            }))
            .into_response()
        }
        Ok(None) => JsonResponse::not_found("Document not found.").into_response(),
        Err(e) => {
            error!("Failed to review document {}: {:?}", document_id, e);
            JsonResponse::server_error("Server error").into_response()
        }
    }
}
