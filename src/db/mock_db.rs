use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use super::{
    document_repository::DocumentRepository,
    error::{
        USERS_EMAIL_KEY, USERS_GOOGLE_ID_KEY, USERS_PHONE_KEY, VEHICLES_OWNER_KEY,
        VEHICLES_PLATE_KEY,
    },
    user_repository::UserRepository,
    vehicle_repository::VehicleRepository,
    RepositoryError,
};
use crate::models::{
    document::{Document, DocumentStatus, DocumentType, NewDocument},
    user::{DriverStatus, Location, NewGoogleUser, ProfileUpdate, User, UserRole},
    vehicle::{NewVehicle, Vehicle, VehicleStatus, VehicleUpdate},
};

/// In-memory stand-in for Postgres, with the same unique constraints.
#[derive(Default)]
pub struct MockDb {
    users: Mutex<Vec<User>>,
    vehicles: Mutex<Vec<Vehicle>>,
    documents: Mutex<Vec<Document>>,
}

impl MockDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, phone: &str, roles: &[UserRole]) -> User {
        let user = blank_user(Some(phone.to_string()), None);
        let user = User {
            role: roles.iter().copied().collect(),
            ..user
        };
        self.users.lock().unwrap().push(user.clone());
        self.hydrate(user)
    }

    pub fn insert_document(
        &self,
        owner: Uuid,
        doc_type: DocumentType,
        status: DocumentStatus,
    ) -> Document {
        let mut documents = self.documents.lock().unwrap();
        let document = Document {
            id: Uuid::new_v4(),
            owner,
            doc_type,
            file_name: format!("{:?}.pdf", doc_type),
            file_path: format!("uploads/{:?}.pdf", doc_type),
            status,
            uploaded_at: Utc::now() + Duration::milliseconds(documents.len() as i64),
        };
        documents.push(document.clone());
        document
    }

    pub fn user(&self, id: Uuid) -> Option<User> {
        let user = self.users.lock().unwrap().iter().find(|u| u.id == id).cloned();
        user.map(|u| self.hydrate(u))
    }

    pub fn vehicle_of(&self, owner: Uuid) -> Option<Vehicle> {
        self.vehicles.lock().unwrap().iter().find(|v| v.owner == owner).cloned()
    }

    pub fn document(&self, id: Uuid) -> Option<Document> {
        self.documents.lock().unwrap().iter().find(|d| d.id == id).cloned()
    }

    fn hydrate(&self, mut user: User) -> User {
        user.vehicle = self
            .vehicles
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.owner == user.id)
            .map(|v| v.id);
        user.documents = self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.owner == user.id)
            .map(|d| d.id)
            .collect();
        user
    }

    fn find_user(&self, pred: impl Fn(&User) -> bool) -> Option<User> {
        let found = self.users.lock().unwrap().iter().find(|u| pred(u)).cloned();
        found.map(|u| self.hydrate(u))
    }

    fn modify_user(&self, id: Uuid, change: impl FnOnce(&mut User)) {
        if let Some(user) = self.users.lock().unwrap().iter_mut().find(|u| u.id == id) {
            change(user);
        }
    }
}

fn blank_user(phone: Option<String>, google_id: Option<String>) -> User {
    User {
        id: Uuid::new_v4(),
        phone,
        google_id,
        first_name: String::new(),
        last_name: String::new(),
        email: None,
        role: BTreeSet::from([UserRole::Rider]),
        status: DriverStatus::Offline,
        location: None,
        vehicle: None,
        documents: Vec::new(),
        created_at: Utc::now(),
    }
}

#[async_trait]
impl UserRepository for MockDb {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self.find_user(|u| u.id == id))
    }

    async fn find_user_by_phone(&self, phone: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.find_user(|u| u.phone.as_deref() == Some(phone)))
    }

    async fn find_user_by_google_id(
        &self,
        google_id: &str,
    ) -> Result<Option<User>, RepositoryError> {
        Ok(self.find_user(|u| u.google_id.as_deref() == Some(google_id)))
    }

    async fn create_user_with_phone(&self, phone: &str) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.phone.as_deref() == Some(phone)) {
            return Err(RepositoryError::Conflict(USERS_PHONE_KEY.to_string()));
        }
        let user = blank_user(Some(phone.to_string()), None);
        users.push(user.clone());
        Ok(user)
    }

    async fn create_user_with_google(
        &self,
        new_user: &NewGoogleUser,
    ) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.google_id.as_deref() == Some(new_user.google_id.as_str())) {
            return Err(RepositoryError::Conflict(USERS_GOOGLE_ID_KEY.to_string()));
        }
        if new_user.email.is_some() && users.iter().any(|u| u.email == new_user.email) {
            return Err(RepositoryError::Conflict(USERS_EMAIL_KEY.to_string()));
        }
        let user = User {
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            email: new_user.email.clone(),
            ..blank_user(None, Some(new_user.google_id.clone()))
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update_user_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, RepositoryError> {
        {
            let mut users = self.users.lock().unwrap();
            let others = |u: &&User| u.id != id;

            if let Some(Some(email)) = &update.email {
                if users.iter().filter(others).any(|u| u.email.as_ref() == Some(email)) {
                    return Err(RepositoryError::Conflict(USERS_EMAIL_KEY.to_string()));
                }
            }
            if let Some(phone) = &update.phone {
                if users.iter().filter(others).any(|u| u.phone.as_ref() == Some(phone)) {
                    return Err(RepositoryError::Conflict(USERS_PHONE_KEY.to_string()));
                }
            }

            let Some(user) = users.iter_mut().find(|u| u.id == id) else {
                return Ok(None);
            };
            if let Some(first_name) = &update.first_name {
                user.first_name = first_name.clone();
            }
            if let Some(last_name) = &update.last_name {
                user.last_name = last_name.clone();
            }
            if let Some(email) = &update.email {
                user.email = email.clone();
            }
            if let Some(phone) = &update.phone {
                user.phone = Some(phone.clone());
            }
        }
        Ok(self.user(id))
    }

    async fn set_user_roles(
        &self,
        id: Uuid,
        roles: &BTreeSet<UserRole>,
    ) -> Result<(), RepositoryError> {
        self.modify_user(id, |u| u.role = roles.clone());
        Ok(())
    }

    async fn set_driver_status(
        &self,
        id: Uuid,
        status: DriverStatus,
    ) -> Result<(), RepositoryError> {
        self.modify_user(id, |u| u.status = status);
        Ok(())
    }

    async fn set_driver_location(
        &self,
        id: Uuid,
        location: Location,
    ) -> Result<(), RepositoryError> {
        self.modify_user(id, |u| u.location = Some(location));
        Ok(())
    }

    async fn list_online_drivers(&self) -> Result<Vec<User>, RepositoryError> {
        let online: Vec<User> = self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.status == DriverStatus::Online && u.is_driver())
            .cloned()
            .collect();
        Ok(online.into_iter().map(|u| self.hydrate(u)).collect())
    }
}

#[async_trait]
impl VehicleRepository for MockDb {
    async fn find_vehicle_by_plate(&self, plate: &str) -> Result<Option<Vehicle>, RepositoryError> {
        Ok(self
            .vehicles
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.license_plate == plate)
            .cloned())
    }

    async fn find_vehicle_by_owner(&self, owner: Uuid) -> Result<Option<Vehicle>, RepositoryError> {
        Ok(self.vehicle_of(owner))
    }

    async fn create_vehicle(&self, vehicle: &NewVehicle) -> Result<Vehicle, RepositoryError> {
        let mut vehicles = self.vehicles.lock().unwrap();
        if vehicles.iter().any(|v| v.license_plate == vehicle.license_plate) {
            return Err(RepositoryError::Conflict(VEHICLES_PLATE_KEY.to_string()));
        }
        if vehicles.iter().any(|v| v.owner == vehicle.owner) {
            return Err(RepositoryError::Conflict(VEHICLES_OWNER_KEY.to_string()));
        }
        let created = Vehicle {
            id: Uuid::new_v4(),
            owner: vehicle.owner,
            vehicle_type: vehicle.vehicle_type,
            make: vehicle.make.clone(),
            model: vehicle.model.clone(),
            license_plate: vehicle.license_plate.clone(),
            color: vehicle.color.clone(),
            status: VehicleStatus::Pending,
            created_at: Utc::now(),
        };
        vehicles.push(created.clone());
        Ok(created)
    }

    async fn update_vehicle(
        &self,
        id: Uuid,
        update: &VehicleUpdate,
    ) -> Result<Option<Vehicle>, RepositoryError> {
        let mut vehicles = self.vehicles.lock().unwrap();
        if let Some(plate) = &update.license_plate {
            if vehicles.iter().any(|v| v.id != id && &v.license_plate == plate) {
                return Err(RepositoryError::Conflict(VEHICLES_PLATE_KEY.to_string()));
            }
        }
        let Some(vehicle) = vehicles.iter_mut().find(|v| v.id == id) else {
            return Ok(None);
        };
        if let Some(vehicle_type) = update.vehicle_type {
            vehicle.vehicle_type = vehicle_type;
        }
        if let Some(make) = &update.make {
            vehicle.make = make.clone();
        }
        if let Some(model) = &update.model {
            vehicle.model = model.clone();
        }
        if let Some(plate) = &update.license_plate {
            vehicle.license_plate = plate.clone();
        }
        if let Some(color) = &update.color {
            vehicle.color = color.clone();
        }
        Ok(Some(vehicle.clone()))
    }

    async fn set_vehicle_status(
        &self,
        id: Uuid,
        status: VehicleStatus,
    ) -> Result<(), RepositoryError> {
        if let Some(vehicle) = self.vehicles.lock().unwrap().iter_mut().find(|v| v.id == id) {
            vehicle.status = status;
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentRepository for MockDb {
    async fn create_document(&self, document: &NewDocument) -> Result<Document, RepositoryError> {
        let mut documents = self.documents.lock().unwrap();
        let created = Document {
            id: Uuid::new_v4(),
            owner: document.owner,
            doc_type: document.doc_type,
            file_name: document.file_name.clone(),
            file_path: document.file_path.clone(),
            status: DocumentStatus::Pending,
            uploaded_at: Utc::now() + Duration::milliseconds(documents.len() as i64),
        };
        documents.push(created.clone());
        Ok(created)
    }

    async fn find_documents_by_owner(&self, owner: Uuid) -> Result<Vec<Document>, RepositoryError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.owner == owner)
            .cloned()
            .collect())
    }

    async fn list_documents_by_status(
        &self,
        status: DocumentStatus,
    ) -> Result<Vec<Document>, RepositoryError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.status == status)
            .cloned()
            .collect())
    }

    async fn set_document_status(
        &self,
        id: Uuid,
        status: DocumentStatus,
    ) -> Result<Option<Document>, RepositoryError> {
        let mut documents = self.documents.lock().unwrap();
        Ok(documents.iter_mut().find(|d| d.id == id).map(|d| {
            d.status = status;
            d.clone()
        }))
    }
}
