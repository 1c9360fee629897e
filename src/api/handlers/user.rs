use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, warn};

use super::auth::{AuthState, User};

#[utoipa::path(
    get,
    path = "/getUser",
    responses(
        (status = 200, description = "Profile of the signed-in user", body = User),
        (status = 400, description = "Not signed in"),
        (status = 500, description = "User lookup failed")
    ),
    tag = "auth"
)]
pub async fn get_user(jar: CookieJar, auth_state: Extension<Arc<AuthState>>) -> Response {
    let session = auth_state.sessions().load(&jar).await;
    if !session.is_logged_in() {
        return logged_out();
    }

    // A logged-in session without a usable user is reset so the next signin
    // starts from scratch.
    let Some(user_id) = session.user_id.as_deref() else {
        warn!("Session {:?} has no user id", session.id);
        reset_session(&auth_state, session.id.as_deref()).await;
        return logged_out();
    };

    match auth_state.store().get_user(user_id).await {
        Ok(Some(user)) => (StatusCode::OK, Json(user)).into_response(),
        Ok(None) => {
            warn!("No stored user {user_id} for session {:?}", session.id);
            reset_session(&auth_state, session.id.as_deref()).await;
            logged_out()
        }
        Err(err) => {
            error!("Failed to lookup user: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "isLoggedIn": true })),
            )
                .into_response()
        }
    }
}

fn logged_out() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "isLoggedIn": false })),
    )
        .into_response()
}

async fn reset_session(auth_state: &AuthState, session_id: Option<&str>) {
    if let Some(session_id) = session_id {
        if let Err(err) = auth_state.sessions().reset(session_id).await {
            error!("Failed to reset session: {err}");
        }
    }
}
