use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tracing::error;
use uuid::Uuid;

use crate::{models::user::User, responses::JsonResponse, state::AppState};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

fn parse_user_id(raw: &str) -> Result<Uuid, Response> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| JsonResponse::bad_request("Invalid user ID").into_response())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// The acting user, named by `userId` in the body or by the `x-user-id`
/// header. The body wins when both are present.
pub async fn current_user(
    state: &AppState,
    headers: &HeaderMap,
    body_user_id: Option<&str>,
) -> Result<User, Response> {
    let header_user_id = headers.get(USER_ID_HEADER).and_then(|v| v.to_str().ok());

    let Some(raw) = non_blank(body_user_id).or(non_blank(header_user_id)) else {
        return Err(JsonResponse::unauthorized("Unauthorized: User ID missing.").into_response());
    };
    let user_id = parse_user_id(raw)?;

    match state.users.find_user_by_id(user_id).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(JsonResponse::not_found("User not found.").into_response()),
        Err(e) => {
            error!("DB error resolving current user: {:?}", e);
            Err(JsonResponse::server_error("Authentication failed.").into_response())
        }
    }
}

/// Looks a user up by id when given, otherwise by phone. `Ok(None)` means no
/// such user; neither key given is a bad request.
pub async fn find_by_id_or_phone(
    state: &AppState,
    user_id: Option<&str>,
    phone: Option<&str>,
) -> Result<Option<User>, Response> {
    let lookup = if let Some(raw) = non_blank(user_id) {
        let id = parse_user_id(raw)?;
        state.users.find_user_by_id(id).await
    } else if let Some(phone) = non_blank(phone) {
        state.users.find_user_by_phone(phone).await
    } else {
        return Err(
            JsonResponse::bad_request("Phone number or User ID is required.").into_response(),
        );
    };

    lookup.map_err(|e| {
        error!("DB error looking up user: {:?}", e);
        JsonResponse::server_error("Database error").into_response()
    })
}

/// Admin console access, granted by the shared `x-admin-secret` header.
pub struct AdminAccess;

impl FromRequestParts<AppState> for AdminAccess {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(ADMIN_SECRET_HEADER)
            .map(|v| v.as_bytes())
            .unwrap_or_default();
        let expected = state.config.admin_secret.as_bytes();

        if !expected.is_empty() && bool::from(provided.ct_eq(expected)) {
            Ok(AdminAccess)
        } else {
            Err(JsonResponse::unauthorized("Unauthorized: Admin access required").into_response())
        }
    }
}
