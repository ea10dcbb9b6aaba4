use thiserror::Error;

pub const USERS_PHONE_KEY: &str = "users_phone_key";
pub const USERS_EMAIL_KEY: &str = "users_email_key";
pub const USERS_GOOGLE_ID_KEY: &str = "users_google_id_key";
pub const VEHICLES_PLATE_KEY: &str = "vehicles_license_plate_key";
pub const VEHICLES_OWNER_KEY: &str = "vehicles_owner_id_key";

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A unique constraint rejected the write. Carries the constraint name.
    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl RepositoryError {
    pub fn is_conflict_on(&self, constraint: &str) -> bool {
        matches!(self, RepositoryError::Conflict(name) if name == constraint)
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                RepositoryError::Conflict(constraint)
            }
            other => RepositoryError::Database(other),
        }
    }
}
