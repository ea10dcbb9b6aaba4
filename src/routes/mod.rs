pub mod admin;
pub mod auth;
pub mod document;
pub mod driver;
pub mod user;
pub mod vehicle;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::services::ServeDir;

use crate::{state::AppState, utils::uploads::PUBLIC_UPLOAD_PREFIX};
use admin::{handle_pending_documents, handle_reject_document, handle_verify_document};
use auth::{
    google_callback, google_login, handle_login, handle_logout, handle_send_otp,
    handle_verify_otp,
};
use document::handle_upload;
use driver::{handle_online_drivers, handle_set_location, handle_set_status};
use user::{handle_get_me, handle_update_me};
use vehicle::{handle_create_vehicle, handle_get_my_vehicle, handle_update_my_vehicle};

/// Slack on top of the per-file cap for multipart framing and the text fields.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;
const MAX_UPLOAD_FILES: usize = 8;

async fn root() -> &'static str {
    "API is running!"
}

pub fn router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes * MAX_UPLOAD_FILES + MULTIPART_OVERHEAD_BYTES;
    let upload_mount = format!("/{}", PUBLIC_UPLOAD_PREFIX);

    let auth_routes = Router::new()
        .route("/login", post(handle_login))
        .route("/google", get(google_login))
        .route("/google/callback", get(google_callback))
        .route("/logout", get(handle_logout));

    let api_routes = Router::new()
        .route("/send-otp", post(handle_send_otp))
        .route("/verify-otp", post(handle_verify_otp))
        .route("/user/me", get(handle_get_me).put(handle_update_me))
        .route("/vehicle", post(handle_create_vehicle))
        .route(
            "/vehicle/me",
            get(handle_get_my_vehicle).put(handle_update_my_vehicle),
        )
        .route(
            "/document",
            post(handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/admin/documents", get(handle_pending_documents))
        .route("/admin/documents/{id}/verify", put(handle_verify_document))
        .route("/admin/documents/{id}/reject", put(handle_reject_document))
        .route("/driver/status", put(handle_set_status))
        .route("/driver/location", put(handle_set_location))
        .route("/driver/online", get(handle_online_drivers));

    Router::new()
        .route("/", get(root))
        .nest("/auth", auth_routes)
        .nest("/api", api_routes)
        .nest_service(&upload_mount, ServeDir::new(&state.config.upload_dir))
        .with_state(state)
}
