//! Login flow endpoints: signin, provider callback, logout.

use axum::{
    Json,
    extract::{Extension, Query},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::IntoParams;

use super::auth::{AuthError, AuthState, Session, SigninOutcome, User};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackParams {
    /// Temporary token echoed back by Twitter.
    #[serde(default)]
    pub oauth_token: String,
    #[serde(default)]
    pub oauth_verifier: String,
}

#[utoipa::path(
    get,
    path = "/twitter/signin",
    responses(
        (status = 200, description = "Already signed in, profile refreshed", body = User),
        (status = 302, description = "Redirect to the Twitter authorization page"),
        (status = 404, description = "Twitter returned no account for the session"),
        (status = 500, description = "Handshake or persistence failure", content_type = "text/plain")
    ),
    tag = "auth"
)]
pub async fn signin(jar: CookieJar, auth_state: Extension<Arc<AuthState>>) -> Response {
    match signin_flow(&auth_state, jar).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/twitter/callback",
    responses(
        (status = 302, description = "Signed in, redirect to the frontend"),
        (status = 404, description = "Twitter returned no account for the session"),
        (status = 500, description = "Unknown oauth_token or token exchange failure", content_type = "text/plain")
    ),
    tag = "auth"
)]
pub async fn callback(
    jar: CookieJar,
    params: Query<CallbackParams>,
    auth_state: Extension<Arc<AuthState>>,
) -> Response {
    match callback_flow(&auth_state, jar, &params).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/twitter/logout",
    responses(
        (status = 302, description = "Session reset, redirect to the frontend"),
        (status = 500, description = "Session could not be reset", content_type = "text/plain")
    ),
    tag = "auth"
)]
pub async fn logout(jar: CookieJar, auth_state: Extension<Arc<AuthState>>) -> Response {
    let session = auth_state.sessions().load(&jar).await;
    // The record is reset in place; the cookie keeps pointing at it.
    if let Some(session_id) = session.id.as_deref() {
        if let Err(err) = auth_state.sessions().reset(session_id).await {
            return err.into_response();
        }
        info!("Session logged out");
    }
    redirect_found(jar, auth_state.config().frontend_base_url())
}

async fn signin_flow(auth_state: &AuthState, jar: CookieJar) -> Result<Response, AuthError> {
    let mut session = auth_state.sessions().load(&jar).await;
    let (outcome, jar) = auth_state
        .twitter()
        .begin_signin(auth_state.sessions(), jar, &mut session)
        .await?;

    match outcome {
        SigninOutcome::Redirect(url) => Ok(redirect_found(jar, &url)),
        SigninOutcome::AlreadySignedIn => {
            let (jar, user) = persist_identity(auth_state, jar, &mut session).await?;
            Ok((StatusCode::OK, jar, Json(user)).into_response())
        }
    }
}

async fn callback_flow(
    auth_state: &AuthState,
    jar: CookieJar,
    params: &CallbackParams,
) -> Result<Response, AuthError> {
    let mut session = auth_state.sessions().load(&jar).await;
    let jar = auth_state
        .twitter()
        .complete_callback(
            auth_state.sessions(),
            jar,
            &mut session,
            &params.oauth_token,
            &params.oauth_verifier,
        )
        .await?;

    let (jar, _user) = persist_identity(auth_state, jar, &mut session).await?;
    Ok(redirect_found(jar, auth_state.config().frontend_base_url()))
}

/// Fetch the Twitter account, store it as the user profile and attach it to
/// the session.
async fn persist_identity(
    auth_state: &AuthState,
    jar: CookieJar,
    session: &mut Session,
) -> Result<(CookieJar, User), AuthError> {
    let account = auth_state
        .twitter()
        .fetch_identity(session)
        .await?
        .ok_or(AuthError::NotFound)?;
    let user = account.into_user();

    auth_state
        .store()
        .put_user(&user)
        .await
        .map_err(|err| AuthError::transient("Error saving user", err))?;

    session.user_id = Some(user.user_id.clone());
    let jar = auth_state.sessions().save(jar, session).await?;
    info!(user_id = %user.user_id, "User signed in");

    Ok((jar, user))
}

fn redirect_found(jar: CookieJar, location: &str) -> Response {
    (StatusCode::FOUND, jar, [(LOCATION, location.to_string())]).into_response()
}
