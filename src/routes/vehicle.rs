use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    db::error::{VEHICLES_OWNER_KEY, VEHICLES_PLATE_KEY},
    models::vehicle::{NewVehicle, VehicleType, VehicleUpdate},
    responses::JsonResponse,
    routes::auth::session::current_user,
    state::AppState,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePayload {
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub vehicle_type: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub license_plate: Option<String>,
    pub color: Option<String>,
}

fn field(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Plates are compared case-insensitively and without spaces.
pub fn normalize_plate(plate: &str) -> String {
    plate
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

pub async fn handle_create_vehicle(
    State(state): State<AppState>,
    Json(payload): Json<VehiclePayload>,
) -> Response {
    let (Some(user_id), Some(vehicle_type), Some(make), Some(model), Some(plate), Some(color)) = (
        field(&payload.user_id),
        field(&payload.vehicle_type),
        field(&payload.make),
        field(&payload.model),
        field(&payload.license_plate),
        field(&payload.color),
    ) else {
        return JsonResponse::bad_request("All fields are required.").into_response();
    };

    let Ok(user_id) = Uuid::parse_str(&user_id) else {
        return JsonResponse::bad_request("Invalid user ID").into_response();
    };
    let vehicle_type: VehicleType = match vehicle_type.parse() {
        Ok(t) => t,
        Err(msg) => return JsonResponse::bad_request(&msg).into_response(),
    };
    let license_plate = normalize_plate(&plate);

    match state.vehicles.find_vehicle_by_plate(&license_plate).await {
        Ok(Some(_)) => {
            return JsonResponse::conflict("Vehicle with this license plate already exists.")
                .into_response()
        }
        Ok(None) => {}
        Err(e) => {
            error!("DB error checking plate: {:?}", e);
            return JsonResponse::server_error("Server error while saving vehicle details.")
                .into_response();
        }
    }

    let user = match state.users.find_user_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return JsonResponse::not_found("User not found.").into_response(),
        Err(e) => {
            error!("DB error loading vehicle owner: {:?}", e);
            return JsonResponse::server_error("Server error while saving vehicle details.")
                .into_response();
        }
    };
    if user.vehicle.is_some() {
        return JsonResponse::conflict("User already has a vehicle associated.").into_response();
    }

    let new_vehicle = NewVehicle {
        owner: user.id,
        vehicle_type,
        make,
        model,
        license_plate,
        color,
    };

    match state.vehicles.create_vehicle(&new_vehicle).await {
        Ok(vehicle) => {
            info!(user_id = %user.id, vehicle_id = %vehicle.id, "Vehicle registered");
            (
                StatusCode::CREATED,
                Json(json!({
                    "success": true,
                    "message": "Vehicle details saved and associated with user successfully.",
                    "vehicle": vehicle
                })),
            )
                .into_response()
        }
        Err(e) if e.is_conflict_on(VEHICLES_PLATE_KEY) => {
            JsonResponse::conflict("Vehicle with this license plate already exists.")
                .into_response()
        }
        Err(e) if e.is_conflict_on(VEHICLES_OWNER_KEY) => {
            JsonResponse::conflict("User already has a vehicle associated.").into_response()
        }
        Err(e) => {
            error!("Error saving vehicle details: {:?}", e);
            JsonResponse::server_error("Server error while saving vehicle details.").into_response()
        }
    }
}

pub async fn handle_get_my_vehicle(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user = match current_user(&state, &headers, None).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    match state.vehicles.find_vehicle_by_owner(user.id).await {
        Ok(Some(vehicle)) => Json(json!({
            "success": true,
            "vehicle": vehicle
        }))
        .into_response(),
        Ok(None) => JsonResponse::not_found("No vehicle linked to this user.").into_response(),
        Err(e) => {
            error!("Error fetching vehicle: {:?}", e);
            JsonResponse::server_error("Server error fetching vehicle.").into_response()
        }
    }
}

pub async fn handle_update_my_vehicle(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<VehiclePayload>,
) -> Response {
    let user = match current_user(&state, &headers, payload.user_id.as_deref()).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let fields = [
        &payload.vehicle_type,
        &payload.make,
        &payload.model,
        &payload.license_plate,
        &payload.color,
    ];
    if fields
        .iter()
        .any(|f| f.as_deref().is_some_and(|v| v.trim().is_empty()))
    {
        return JsonResponse::bad_request("Vehicle fields cannot be empty.").into_response();
    }

    let vehicle_type = match field(&payload.vehicle_type).map(|t| t.parse::<VehicleType>()) {
        None => None,
        Some(Ok(t)) => Some(t),
        Some(Err(msg)) => return JsonResponse::bad_request(&msg).into_response(),
    };

    let update = VehicleUpdate {
        vehicle_type,
        make: field(&payload.make),
        model: field(&payload.model),
        license_plate: field(&payload.license_plate).map(|p| normalize_plate(&p)),
        color: field(&payload.color),
    };

    let vehicle = match state.vehicles.find_vehicle_by_owner(user.id).await {
        Ok(Some(vehicle)) => vehicle,
        Ok(None) => {
            return JsonResponse::not_found("No vehicle linked to this user.").into_response()
        }
        Err(e) => {
            error!("Error fetching vehicle: {:?}", e);
            return JsonResponse::server_error("Server error updating vehicle.").into_response();
        }
    };

    match state.vehicles.update_vehicle(vehicle.id, &update).await {
        Ok(Some(vehicle)) => Json(json!({
            "success": true,
            "message": "Vehicle details updated.",
            "vehicle": vehicle
        }))
        .into_response(),
        Ok(None) => JsonResponse::not_found("No vehicle linked to this user.").into_response(),
        Err(e) if e.is_conflict_on(VEHICLES_PLATE_KEY) => {
            JsonResponse::conflict("Vehicle with this license plate already exists.")
                .into_response()
        }
        Err(e) => {
            error!("Error updating vehicle: {:?}", e);
            JsonResponse::server_error("Server error updating vehicle.").into_response()
        }
    }
}
