use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryError;
use crate::models::vehicle::{NewVehicle, Vehicle, VehicleStatus, VehicleUpdate};

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn find_vehicle_by_plate(&self, plate: &str) -> Result<Option<Vehicle>, RepositoryError>;

    async fn find_vehicle_by_owner(&self, owner: Uuid) -> Result<Option<Vehicle>, RepositoryError>;

    async fn create_vehicle(&self, vehicle: &NewVehicle) -> Result<Vehicle, RepositoryError>;

    async fn update_vehicle(
        &self,
        id: Uuid,
        update: &VehicleUpdate,
    ) -> Result<Option<Vehicle>, RepositoryError>;

    async fn set_vehicle_status(&self, id: Uuid, status: VehicleStatus)
        -> Result<(), RepositoryError>;
}
