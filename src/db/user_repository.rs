use std::collections::BTreeSet;

use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryError;
use crate::models::user::{DriverStatus, Location, NewGoogleUser, ProfileUpdate, User, UserRole};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;

    async fn find_user_by_phone(&self, phone: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_user_by_google_id(&self, google_id: &str)
        -> Result<Option<User>, RepositoryError>;

    /// Creates a rider with only a phone number set.
    async fn create_user_with_phone(&self, phone: &str) -> Result<User, RepositoryError>;

    async fn create_user_with_google(
        &self,
        new_user: &NewGoogleUser,
    ) -> Result<User, RepositoryError>;

    /// Returns `None` when no user has the given id.
    async fn update_user_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, RepositoryError>;

    async fn set_user_roles(
        &self,
        id: Uuid,
        roles: &BTreeSet<UserRole>,
    ) -> Result<(), RepositoryError>;

    async fn set_driver_status(&self, id: Uuid, status: DriverStatus)
        -> Result<(), RepositoryError>;

    async fn set_driver_location(&self, id: Uuid, location: Location)
        -> Result<(), RepositoryError>;

    /// Users holding the driver role whose status is online.
    async fn list_online_drivers(&self) -> Result<Vec<User>, RepositoryError>;
}
