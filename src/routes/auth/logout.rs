use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration as TimeDuration;

use super::google_login::OAUTH_STATE_COOKIE;
use crate::state::AppState;

/// There is no server session; logging out only drops the OAuth state
/// cookie and sends the browser home.
pub async fn handle_logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let expired_cookie = Cookie::build((OAUTH_STATE_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::seconds(0))
        .build();

    (
        jar.add(expired_cookie),
        Redirect::to(&format!("{}/", state.config.frontend_origin.trim_end_matches('/'))),
    )
}
