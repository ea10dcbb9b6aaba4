use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{prelude::Type, FromRow};
use uuid::Uuid;

use super::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "document_type")]
pub enum DocumentType {
    #[sqlx(rename = "driverLicense")]
    #[serde(rename = "driverLicense")]
    DriverLicense,
    #[sqlx(rename = "vehicleRC")]
    #[serde(rename = "vehicleRC")]
    VehicleRc,
    #[sqlx(rename = "vehicleInsurance")]
    #[serde(rename = "vehicleInsurance")]
    VehicleInsurance,
    #[sqlx(rename = "vehiclePhoto")]
    #[serde(rename = "vehiclePhoto")]
    VehiclePhoto,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "document_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[sqlx(rename = "owner_id")]
    pub owner: Uuid,
    #[sqlx(rename = "doc_type")]
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub file_name: String,
    pub file_path: String,
    pub status: DocumentStatus,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub owner: Uuid,
    pub doc_type: DocumentType,
    pub file_name: String,
    pub file_path: String,
}

/// A document as listed in the review console, with its owner inlined in
/// place of the owner id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDocument {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub owner: Option<User>,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub file_name: String,
    pub file_path: String,
    pub status: DocumentStatus,
    pub uploaded_at: DateTime<Utc>,
}

impl ReviewDocument {
    pub fn new(document: Document, owner: Option<User>) -> Self {
        Self {
            id: document.id,
            owner,
            doc_type: document.doc_type,
            file_name: document.file_name,
            file_path: document.file_path,
            status: document.status,
            uploaded_at: document.uploaded_at,
        }
    }
}
