use axum::{
    extract::{Json, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::{
    models::user::{DriverStatus, Location, PublicDriver, User},
    responses::JsonResponse,
    routes::auth::session::current_user,
    state::AppState,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPayload {
    pub user_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPayload {
    pub user_id: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

async fn current_driver(
    state: &AppState,
    headers: &HeaderMap,
    body_user_id: Option<&str>,
) -> Result<User, Response> {
    let user = current_user(state, headers, body_user_id).await?;
    if !user.is_driver() {
        return Err(JsonResponse::forbidden("Forbidden: Only drivers can do this.").into_response());
    }
    Ok(user)
}

pub async fn handle_set_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<StatusPayload>,
) -> Response {
    let user = match current_driver(&state, &headers, payload.user_id.as_deref()).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let status = match payload.status.as_deref() {
        Some("online") => DriverStatus::Online,
        Some("offline") => DriverStatus::Offline,
        _ => {
            return JsonResponse::bad_request(
                "Invalid status provided. Must be \"online\" or \"offline\".",
            )
            .into_response()
        }
    };
    let label = if status == DriverStatus::Online { "online" } else { "offline" };

    if let Err(e) = state.users.set_driver_status(user.id, status).await {
        error!("Error updating driver status: {:?}", e);
        return JsonResponse::server_error("Server error updating status.").into_response();
    }

    info!(user_id = %user.id, "Driver is now {}", label);
    Json(json!({
        "success": true,
        "message": format!("Driver status set to {}.", label),
        "status": status
    }))
    .into_response()
}

pub async fn handle_set_location(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LocationPayload>,
) -> Response {
    let user = match current_driver(&state, &headers, payload.user_id.as_deref()).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let (Some(latitude), Some(longitude)) = (payload.latitude, payload.longitude) else {
        return JsonResponse::bad_request("Latitude and longitude are required.").into_response();
    };
    let location = Location { latitude, longitude };
    if !location.is_valid() {
        return JsonResponse::bad_request("Invalid coordinates.").into_response();
    }
    if user.status != DriverStatus::Online {
        return JsonResponse::conflict("Driver must be online to share location.").into_response();
    }

    match state.users.set_driver_location(user.id, location).await {
        Ok(()) => Json(json!({
            "success": true,
            "location": location
        }))
        .into_response(),
        Err(e) => {
            error!("Error updating driver location: {:?}", e);
            JsonResponse::server_error("Server error updating location.").into_response()
        }
    }
}

pub async fn handle_online_drivers(State(state): State<AppState>) -> Response {
    match state.users.list_online_drivers().await {
        Ok(drivers) => {
            let drivers: Vec<PublicDriver> = drivers.into_iter().map(PublicDriver::from).collect();
            Json(json!({
                "success": true,
                "drivers": drivers
            }))
            .into_response()
        }
        Err(e) => {
            error!("Error listing online drivers: {:?}", e);
            JsonResponse::server_error("Server error").into_response()
        }
    }
}
