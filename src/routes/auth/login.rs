use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::{
    db::error::USERS_PHONE_KEY,
    models::user::User,
    responses::JsonResponse,
    services::otp::to_e164,
    state::AppState,
};

#[derive(Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Deserialize)]
pub struct VerifyOtpPayload {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

fn required_phone(phone: &Option<String>) -> Option<&str> {
    phone.as_deref().map(str::trim).filter(|p| !p.is_empty())
}

/// Finds the account for a phone number, creating a rider on first sight.
async fn find_or_create_by_phone(state: &AppState, phone: &str) -> Result<User, Response> {
    match state.users.find_user_by_phone(phone).await {
        Ok(Some(user)) => return Ok(user),
        Ok(None) => {}
        Err(e) => {
            error!("DB error: {:?}", e);
            return Err(JsonResponse::server_error("Database error").into_response());
        }
    }

    match state.users.create_user_with_phone(phone).await {
        Ok(user) => {
            info!(user_id = %user.id, "Created rider account");
            Ok(user)
        }
        // Lost a race with a concurrent login for the same phone.
        Err(e) if e.is_conflict_on(USERS_PHONE_KEY) => {
            match state.users.find_user_by_phone(phone).await {
                Ok(Some(user)) => Ok(user),
                other => {
                    error!("User vanished after phone conflict: {:?}", other);
                    Err(JsonResponse::server_error("Database error").into_response())
                }
            }
        }
        Err(e) => {
            error!("Failed to create user: {:?}", e);
            Err(JsonResponse::server_error("Could not create user").into_response())
        }
    }
}

pub async fn handle_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Response {
    let Some(phone) = required_phone(&payload.phone) else {
        return JsonResponse::bad_request("Phone number is required").into_response();
    };

    match find_or_create_by_phone(&state, phone).await {
        Ok(user) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "user": user
            })),
        )
            .into_response(),
        Err(resp) => resp,
    }
}

pub async fn handle_send_otp(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Response {
    let Some(phone) = required_phone(&payload.phone) else {
        return JsonResponse::bad_request("Phone number is required").into_response();
    };

    let to = to_e164(phone, &state.config.otp_country_code);
    match state.otp.send_code(&to).await {
        Ok(sid) => Json(json!({
            "success": true,
            "message": "OTP sent",
            "sid": sid
        }))
        .into_response(),
        Err(e) => {
            error!("OTP send failed: {:?}", e);
            JsonResponse::server_error("Failed to send OTP").into_response()
        }
    }
}

pub async fn handle_verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpPayload>,
) -> Response {
    let (Some(phone), Some(code)) = (
        required_phone(&payload.phone),
        payload.code.as_deref().map(str::trim).filter(|c| !c.is_empty()),
    ) else {
        return JsonResponse::bad_request("Phone number and code are required").into_response();
    };

    let to = to_e164(phone, &state.config.otp_country_code);
    match state.otp.check_code(&to, code).await {
        Ok(true) => {}
        Ok(false) => return JsonResponse::bad_request("Invalid OTP").into_response(),
        Err(e) => {
            error!("OTP check failed: {:?}", e);
            return JsonResponse::server_error("Failed to verify OTP").into_response();
        }
    }

    match state.users.find_user_by_phone(phone).await {
        Ok(Some(user)) => Json(json!({
            "success": true,
            "message": "Phone verified",
            "user": user
        }))
        .into_response(),
        Ok(None) => JsonResponse::not_found("User not found after verification.").into_response(),
        Err(e) => {
            error!("DB error after OTP check: {:?}", e);
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{Method, StatusCode};
    use mockall::predicate::eq;
    use serde_json::json;

    use crate::{
        db::mock_db::MockDb,
        models::user::UserRole,
        services::{google_identity::MockGoogleIdentity, otp::MockOtpProvider},
        test_support::{json_request, send, test_state, test_state_with},
    };

    #[tokio::test]
    async fn login_requires_phone() {
        let state = test_state(Arc::new(MockDb::new()));
        let (status, body) =
            send(state, json_request(Method::POST, "/auth/login", json!({}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn login_creates_rider_once() {
        let db = Arc::new(MockDb::new());
        let state = test_state(db.clone());

        let (status, first) = send(
            state.clone(),
            json_request(Method::POST, "/auth/login", json!({ "phone": "9876543210" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["user"]["role"], json!(["rider"]));
        assert_eq!(first["user"]["status"], "offline");

        let (_, second) = send(
            state,
            json_request(Method::POST, "/auth/login", json!({ "phone": "9876543210" })),
        )
        .await;
        assert_eq!(first["user"]["_id"], second["user"]["_id"]);
    }

    #[tokio::test]
    async fn send_otp_uses_e164_number() {
        let mut otp = MockOtpProvider::new();
        otp.expect_send_code()
            .with(eq("+919876543210"))
            .times(1)
            .returning(|_| Ok("VE123".to_string()));
        let state = test_state_with(Arc::new(MockDb::new()), otp, MockGoogleIdentity::new());

        let (status, body) = send(
            state,
            json_request(Method::POST, "/api/send-otp", json!({ "phone": "9876543210" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sid"], "VE123");
    }

    #[tokio::test]
    async fn send_otp_provider_failure_is_500() {
        let mut otp = MockOtpProvider::new();
        otp.expect_send_code()
            .returning(|_| Err(anyhow::anyhow!("twilio down")));
        let state = test_state_with(Arc::new(MockDb::new()), otp, MockGoogleIdentity::new());

        let (status, _) = send(
            state,
            json_request(Method::POST, "/api/send-otp", json!({ "phone": "9876543210" })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn verify_otp_returns_user_when_approved() {
        let db = Arc::new(MockDb::new());
        let user = db.insert_user("9876543210", &[UserRole::Rider]);

        let mut otp = MockOtpProvider::new();
        otp.expect_check_code()
            .with(eq("+919876543210"), eq("123456"))
            .returning(|_, _| Ok(true));
        let state = test_state_with(db, otp, MockGoogleIdentity::new());

        let (status, body) = send(
            state,
            json_request(
                Method::POST,
                "/api/verify-otp",
                json!({ "phone": "9876543210", "code": "123456" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["_id"], json!(user.id));
    }

    #[tokio::test]
    async fn verify_otp_rejects_wrong_code() {
        let mut otp = MockOtpProvider::new();
        otp.expect_check_code().returning(|_, _| Ok(false));
        let state = test_state_with(Arc::new(MockDb::new()), otp, MockGoogleIdentity::new());

        let (status, body) = send(
            state,
            json_request(
                Method::POST,
                "/api/verify-otp",
                json!({ "phone": "9876543210", "code": "000000" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid OTP");
    }

    #[tokio::test]
    async fn verify_otp_without_account_is_404() {
        let mut otp = MockOtpProvider::new();
        otp.expect_check_code().returning(|_, _| Ok(true));
        let state = test_state_with(Arc::new(MockDb::new()), otp, MockGoogleIdentity::new());

        let (status, _) = send(
            state,
            json_request(
                Method::POST,
                "/api/verify-otp",
                json!({ "phone": "9876543210", "code": "123456" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
