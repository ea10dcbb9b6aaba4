use std::collections::HashMap;

use axum::{extract::{Query, State}, response::{IntoResponse, Redirect, Response}};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{error, info};

use crate::{
    db::error::{USERS_EMAIL_KEY, USERS_GOOGLE_ID_KEY},
    models::user::{normalize_email, NewGoogleUser},
    responses::JsonResponse,
    state::AppState,
    utils::csrf::generate_csrf_token,
};

pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

pub async fn google_login(State(state): State<AppState>, jar: CookieJar) -> Response {
    let csrf = generate_csrf_token();

    let url = match state.google.authorize_url(&csrf) {
        Ok(url) => url,
        Err(e) => {
            error!("Google authorize URL: {:?}", e);
            return JsonResponse::server_error("Google sign-in is not available").into_response();
        }
    };

    let oauth_state_cookie = Cookie::build((OAUTH_STATE_COOKIE, csrf))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::minutes(10))
        .build();

    (jar.add(oauth_state_cookie), Redirect::to(&url)).into_response()
}

pub async fn google_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let frontend = state.config.frontend_origin.trim_end_matches('/').to_string();
    let fail =
        |msg: &str| JsonResponse::redirect_to_login_with_error(&frontend, msg).into_response();

    if let Some(denied) = params.get("error") {
        return fail(&format!("Google sign-in was cancelled: {}", denied));
    }

    let Some(code) = params.get("code") else {
        return fail("Missing 'code' param");
    };

    let Some(state_param) = params.get("state") else {
        return fail("Missing 'state' param");
    };

    let Some(expected_state) = jar.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_string()) else {
        return fail("Missing 'oauth_state' cookie");
    };

    if state_param != &expected_state {
        return fail("Invalid state");
    }

    let profile = match state.google.fetch_profile(code).await {
        Ok(profile) => profile,
        Err(e) => {
            error!("Google profile fetch failed: {:?}", e);
            return fail("Google sign-in failed");
        }
    };

    let user = match state.users.find_user_by_google_id(&profile.sub).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            let new_user = NewGoogleUser {
                google_id: profile.sub.clone(),
                first_name: profile.given_name.clone().unwrap_or_default(),
                last_name: profile.family_name.clone().unwrap_or_default(),
                email: profile.email.as_deref().and_then(normalize_email),
            };
            match state.users.create_user_with_google(&new_user).await {
                Ok(user) => {
                    info!(user_id = %user.id, "Created rider account from Google sign-in");
                    user
                }
                // A concurrent callback for the same Google account won.
                Err(e) if e.is_conflict_on(USERS_GOOGLE_ID_KEY) => {
                    match state.users.find_user_by_google_id(&profile.sub).await {
                        Ok(Some(user)) => user,
                        other => {
                            error!("User vanished after googleId conflict: {:?}", other);
                            return fail("User creation failed");
                        }
                    }
                }
                Err(e) if e.is_conflict_on(USERS_EMAIL_KEY) => {
                    return fail("This email is already linked to another account. Please log in with your phone number.");
                }
                Err(e) => {
                    error!("DB create error: {:?}", e);
                    return fail("User creation failed");
                }
            }
        }
        Err(e) => {
            error!("DB query error: {:?}", e);
            return fail("DB query failed");
        }
    };

    let clear_state_cookie = Cookie::build((OAUTH_STATE_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::seconds(0))
        .build();

    (
        jar.add(clear_state_cookie),
        Redirect::to(&format!("{}/profile?userId={}", frontend, user.id)),
    )
        .into_response()
}
