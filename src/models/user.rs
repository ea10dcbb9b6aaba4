use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::Type;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "user_role")]       // Matches the Postgres enum name
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Rider,
    PendingDriver,
    Driver,
    Admin,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "driver_status")]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    #[default]
    Offline,
    Online,
    OnTrip,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A rider, driver or admin account.
///
/// `vehicle` and `documents` are not stored on the user row; repositories
/// fill them from the vehicle and document tables on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub phone: Option<String>,
    pub google_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub role: BTreeSet<UserRole>,
    pub status: DriverStatus,
    pub location: Option<Location>,
    pub vehicle: Option<Uuid>,
    pub documents: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.role.contains(&role)
    }

    pub fn is_driver(&self) -> bool {
        self.has_role(UserRole::Driver)
    }
}

/// What other users get to see of a driver on the live map.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicDriver {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub status: DriverStatus,
    pub location: Option<Location>,
}

impl From<User> for PublicDriver {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            status: user.status,
            location: user.location,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewGoogleUser {
    pub google_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

/// Partial profile update. `None` leaves a field untouched; for `email`,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<Option<String>>,
    pub phone: Option<String>,
}

/// Emails are stored trimmed and lowercased; blank means "no email".
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    (!email.is_empty()).then_some(email)
}
