use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{prelude::Type, FromRow};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "vehicle_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Car,
    Bike,
    AutoRickshaw,
    Truck,
    Bus,
    CommercialCar,
    Motorbike,
    CommercialMotorbike,
    CommercialTruck,
    CommercialBus,
}

impl VehicleType {
    pub const ALL: [VehicleType; 10] = [
        VehicleType::Car,
        VehicleType::Bike,
        VehicleType::AutoRickshaw,
        VehicleType::Truck,
        VehicleType::Bus,
        VehicleType::CommercialCar,
        VehicleType::Motorbike,
        VehicleType::CommercialMotorbike,
        VehicleType::CommercialTruck,
        VehicleType::CommercialBus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Car => "car",
            VehicleType::Bike => "bike",
            VehicleType::AutoRickshaw => "auto_rickshaw",
            VehicleType::Truck => "truck",
            VehicleType::Bus => "bus",
            VehicleType::CommercialCar => "commercial_car",
            VehicleType::Motorbike => "motorbike",
            VehicleType::CommercialMotorbike => "commercial_motorbike",
            VehicleType::CommercialTruck => "commercial_truck",
            VehicleType::CommercialBus => "commercial_bus",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VehicleType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown vehicle type '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "vehicle_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    #[default]
    Pending,
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[sqlx(rename = "owner_id")]
    pub owner: Uuid,
    #[sqlx(rename = "vehicle_type")]
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    pub make: String,
    pub model: String,
    pub license_plate: String,
    pub color: String,
    pub status: VehicleStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub owner: Uuid,
    pub vehicle_type: VehicleType,
    pub make: String,
    pub model: String,
    pub license_plate: String,
    pub color: String,
}

#[derive(Debug, Clone, Default)]
pub struct VehicleUpdate {
    pub vehicle_type: Option<VehicleType>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub license_plate: Option<String>,
    pub color: Option<String>,
}
