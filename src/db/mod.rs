pub mod document_repository;
pub mod error;
pub mod postgres_db;
pub mod user_repository;
pub mod vehicle_repository;

#[cfg(test)]
pub mod mock_db;

pub use error::RepositoryError;
