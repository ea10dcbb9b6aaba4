use serde::Serialize;
use axum::{http::StatusCode, response::{IntoResponse, Redirect}, Json};

#[derive(Serialize)]
pub struct JsonResponse {
    pub status: String,
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    fn with_status(code: StatusCode, msg: &str) -> impl IntoResponse {
        let success = code.is_success();
        (
            code,
            Json(JsonResponse {
                status: if success { "success" } else { "error" }.to_string(),
                success,
                message: msg.to_string(),
            }),
        )
    }

    pub fn bad_request(msg: &str) -> impl IntoResponse {
        Self::with_status(StatusCode::BAD_REQUEST, msg)
    }

    pub fn unauthorized(msg: &str) -> impl IntoResponse {
        Self::with_status(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn forbidden(msg: &str) -> impl IntoResponse {
        Self::with_status(StatusCode::FORBIDDEN, msg)
    }

    pub fn not_found(msg: &str) -> impl IntoResponse {
        Self::with_status(StatusCode::NOT_FOUND, msg)
    }

    pub fn conflict(msg: &str) -> impl IntoResponse {
        Self::with_status(StatusCode::CONFLICT, msg)
    }

    pub fn server_error(msg: &str) -> impl IntoResponse {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Sends the browser back to the login page with an error to display.
    pub fn redirect_to_login_with_error(frontend_origin: &str, msg: &str) -> impl IntoResponse {
        Redirect::to(&format!(
            "{}/login?error={}",
            frontend_origin.trim_end_matches('/'),
            urlencoding::encode(msg)
        ))
    }
}
