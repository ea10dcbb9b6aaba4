use axum::{
    extract::{multipart::Field, Multipart, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    models::document::{DocumentType, NewDocument},
    responses::JsonResponse,
    services::driver_verification::roles_after_upload,
    state::AppState,
    utils::uploads::{discard_file, is_allowed_content_type, store_file},
};

/// Multipart field name → stored document type and how many files it takes.
fn upload_slot(field_name: &str) -> Option<(DocumentType, usize)> {
    match field_name {
        "driverLicense" => Some((DocumentType::DriverLicense, 1)),
        "vehicleRC" => Some((DocumentType::VehicleRc, 1)),
        "vehicleInsurance" => Some((DocumentType::VehicleInsurance, 1)),
        "vehiclePhotos" => Some((DocumentType::VehiclePhoto, 5)),
        _ => None,
    }
}

struct ReceivedFile {
    field: String,
    doc_type: DocumentType,
    original_name: Option<String>,
    bytes: Vec<u8>,
}

enum FieldError {
    TooLarge,
    Malformed,
}

async fn read_limited(field: &mut Field<'_>, max_bytes: usize) -> Result<Vec<u8>, FieldError> {
    let mut bytes = Vec::new();
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                if bytes.len() + chunk.len() > max_bytes {
                    return Err(FieldError::TooLarge);
                }
                bytes.extend_from_slice(&chunk);
            }
            Ok(None) => return Ok(bytes),
            Err(e) => {
                warn!("Multipart read error: {:?}", e);
                return Err(FieldError::Malformed);
            }
        }
    }
}

pub async fn handle_upload(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut user_id: Option<String> = None;
    let mut files: Vec<ReceivedFile> = Vec::new();

    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Malformed multipart body: {:?}", e);
                return JsonResponse::bad_request("Malformed upload.").into_response();
            }
        };
        let name = field.name().unwrap_or_default().to_string();

        if name == "userId" {
            match field.text().await {
                Ok(text) => user_id = Some(text),
                Err(_) => return JsonResponse::bad_request("Malformed upload.").into_response(),
            }
            continue;
        }

        let Some((doc_type, max_files)) = upload_slot(&name) else {
            return JsonResponse::bad_request(&format!("Unexpected field '{}'.", name))
                .into_response();
        };
        if files.iter().filter(|f| f.field == name).count() >= max_files {
            return JsonResponse::bad_request(&format!("Too many files for '{}'.", name))
                .into_response();
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !is_allowed_content_type(&content_type) {
            return JsonResponse::bad_request("Invalid file type.").into_response();
        }

        let original_name = field.file_name().map(str::to_string);
        let bytes = match read_limited(&mut field, state.config.max_upload_bytes).await {
            Ok(bytes) => bytes,
            Err(FieldError::TooLarge) => {
                return JsonResponse::bad_request("File too large.").into_response()
            }
            Err(FieldError::Malformed) => {
                return JsonResponse::bad_request("Malformed upload.").into_response()
            }
        };

        files.push(ReceivedFile {
            field: name,
            doc_type,
            original_name,
            bytes,
        });
    }

    let Some(user_id) = user_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
        return JsonResponse::bad_request("User ID is required.").into_response();
    };
    let Ok(user_id) = Uuid::parse_str(user_id) else {
        return JsonResponse::bad_request("Invalid user ID").into_response();
    };
    if files.is_empty() {
        return JsonResponse::bad_request("No documents provided.").into_response();
    }

    let user = match state.users.find_user_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return JsonResponse::not_found("User not found.").into_response(),
        Err(e) => {
            error!("DB error loading uploader: {:?}", e);
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    let mut uploaded = Vec::with_capacity(files.len());
    for file in files {
        let stored = match store_file(
            &state.config.upload_dir,
            &file.field,
            file.original_name.as_deref(),
            &file.bytes,
        )
        .await
        {
            Ok(stored) => stored,
            Err(e) => {
                error!("Failed to store upload: {:?}", e);
                return JsonResponse::server_error("Failed to store document.").into_response();
            }
        };

        let new_document = NewDocument {
            owner: user.id,
            doc_type: file.doc_type,
            file_name: stored.file_name.clone(),
            file_path: stored.file_path.clone(),
        };
        match state.documents.create_document(&new_document).await {
            Ok(document) => uploaded.push(document.id),
            Err(e) => {
                error!("Failed to save document record: {:?}", e);
                discard_file(&stored).await;
                return JsonResponse::server_error("Failed to save document.").into_response();
            }
        }
    }

    if let Some(roles) = roles_after_upload(&user.role) {
        match state.users.set_user_roles(user.id, &roles).await {
            Ok(()) => info!(user_id = %user.id, "User is now a pending driver"),
            Err(e) => error!(user_id = %user.id, "Failed to mark pending driver: {:?}", e),
        }
    }

    Json(json!({
        "success": true,
        "message": "Documents uploaded and submitted for verification.",
        "documents": uploaded
    }))
    .into_response()
}
