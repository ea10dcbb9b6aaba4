use crate::config::Config;
use crate::db::{
    document_repository::DocumentRepository, user_repository::UserRepository,
    vehicle_repository::VehicleRepository,
};
use crate::services::{google_identity::GoogleIdentity, otp::OtpProvider};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub vehicles: Arc<dyn VehicleRepository>,
    pub documents: Arc<dyn DocumentRepository>,
    pub otp: Arc<dyn OtpProvider>,
    pub google: Arc<dyn GoogleIdentity>,
    pub config: Arc<Config>,
}
