use axum::{
    extract::{Json, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::{
    db::error::{USERS_EMAIL_KEY, USERS_PHONE_KEY},
    models::user::{normalize_email, ProfileUpdate},
    responses::JsonResponse,
    routes::auth::session::find_by_id_or_phone,
    state::AppState,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeQuery {
    pub phone: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMePayload {
    pub phone: Option<String>,
    pub user_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

/// An unencoded `+` in a query string decodes to a space, so `?phone=+91...`
/// arrives as `" 91..."`. Put the plus back before the lookup.
fn restore_query_plus(phone: &str) -> String {
    match phone.strip_prefix(' ') {
        Some(rest) if rest.trim_start().starts_with(|c: char| c.is_ascii_digit()) => {
            format!("+{}", rest.trim())
        }
        _ => phone.to_string(),
    }
}

pub async fn handle_get_me(
    State(state): State<AppState>,
    Query(query): Query<MeQuery>,
) -> Response {
    let phone = query.phone.as_deref().map(restore_query_plus);
    match find_by_id_or_phone(&state, query.user_id.as_deref(), phone.as_deref()).await {
        Ok(Some(user)) => Json(json!({
            "success": true,
            "user": user
        }))
        .into_response(),
        Ok(None) => JsonResponse::not_found("User not found.").into_response(),
        Err(resp) => resp,
    }
}

pub async fn handle_update_me(
    State(state): State<AppState>,
    Json(payload): Json<UpdateMePayload>,
) -> Response {
    let user = match find_by_id_or_phone(
        &state,
        payload.user_id.as_deref(),
        payload.phone.as_deref(),
    )
    .await
    {
        Ok(Some(user)) => user,
        Ok(None) => return JsonResponse::not_found("User not found for update.").into_response(),
        Err(resp) => return resp,
    };

    let update = ProfileUpdate {
        first_name: payload.first_name.map(|s| s.trim().to_string()),
        last_name: payload.last_name.map(|s| s.trim().to_string()),
        email: payload.email.as_deref().map(normalize_email),
        phone: payload
            .phone
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    };

    match state.users.update_user_profile(user.id, &update).await {
        Ok(Some(user)) => Json(json!({
            "success": true,
            "message": "Profile updated successfully!",
            "user": user
        }))
        .into_response(),
        Ok(None) => JsonResponse::not_found("User not found for update.").into_response(),
        Err(e) if e.is_conflict_on(USERS_EMAIL_KEY) => {
            JsonResponse::conflict("Email already exists.").into_response()
        }
        Err(e) if e.is_conflict_on(USERS_PHONE_KEY) => {
            JsonResponse::conflict("Phone number already in use.").into_response()
        }
        Err(e) => {
            error!("Error updating user profile: {:?}", e);
            JsonResponse::server_error("Server error updating profile.").into_response()
        }
    }
}
