use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryError;
use crate::models::document::{Document, DocumentStatus, NewDocument};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn create_document(&self, document: &NewDocument) -> Result<Document, RepositoryError>;

    /// Oldest upload first.
    async fn find_documents_by_owner(&self, owner: Uuid) -> Result<Vec<Document>, RepositoryError>;

    async fn list_documents_by_status(
        &self,
        status: DocumentStatus,
    ) -> Result<Vec<Document>, RepositoryError>;

    /// Returns the updated document, or `None` if the id is unknown.
    async fn set_document_status(
        &self,
        id: Uuid,
        status: DocumentStatus,
    ) -> Result<Option<Document>, RepositoryError>;
}
