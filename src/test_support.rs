use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
};
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    config::{Config, GoogleConfig, TwilioConfig},
    db::mock_db::MockDb,
    routes,
    services::{google_identity::MockGoogleIdentity, otp::MockOtpProvider},
    state::AppState,
};

pub const TEST_ADMIN_SECRET: &str = "test-admin-secret";

pub fn test_config() -> Config {
    Config {
        port: 0,
        database_url: "postgres://localhost/zatse_test".into(),
        frontend_origin: "http://localhost:3000".into(),
        admin_secret: TEST_ADMIN_SECRET.into(),
        upload_dir: std::env::temp_dir().join(format!("zatse-uploads-{}", Uuid::new_v4())),
        max_upload_bytes: 5 * 1024 * 1024,
        otp_country_code: "+91".into(),
        twilio: TwilioConfig {
            account_sid: "AC_test".into(),
            auth_token: "token".into(),
            service_sid: "VA_test".into(),
            api_base: "http://127.0.0.1:9".into(),
        },
        google: GoogleConfig {
            client_id: "client-id".into(),
            client_secret: "client-secret".into(),
            redirect_uri: "http://localhost:5000/auth/google/callback".into(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".into(),
            token_url: "http://127.0.0.1:9/token".into(),
            user_info_url: "http://127.0.0.1:9/userinfo".into(),
        },
    }
}

pub fn test_state(db: Arc<MockDb>) -> AppState {
    test_state_with(db, MockOtpProvider::new(), MockGoogleIdentity::new())
}

pub fn test_state_with(
    db: Arc<MockDb>,
    otp: MockOtpProvider,
    google: MockGoogleIdentity,
) -> AppState {
    AppState {
        users: db.clone(),
        vehicles: db.clone(),
        documents: db,
        otp: Arc::new(otp),
        google: Arc::new(google),
        config: Arc::new(test_config()),
    }
}

pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Runs one request through the full router. Non-JSON bodies come back as
/// `Value::Null`.
pub async fn send(state: AppState, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let res = routes::router(state).oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}
