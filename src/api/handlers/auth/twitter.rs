//! Twitter as the identity provider.
//!
//! Flow Overview:
//! - `begin_signin` fetches temporary credentials and parks them in the
//!   session (`PendingCallback`), then hands back the authorization URL.
//! - `complete_callback` checks the returned `oauth_token` against the parked
//!   one and swaps the temporary pair for token credentials.
//! - `fetch_identity` reads the account behind the token credentials.
//!
//! Security boundaries: temporary credentials never survive into an
//! authenticated session; a callback for any other token is rejected before
//! the token endpoint is contacted.

use anyhow::{Context, Result, anyhow};
use axum_extra::extract::cookie::CookieJar;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use super::{
    error::AuthError,
    models::{Session, SessionAuth, User},
    oauth1::OAuthClient,
    session::SessionManager,
    state::TwitterConfig,
};
use crate::APP_USER_AGENT;

const REQUEST_TOKEN_PATH: &str = "/oauth/request_token";
const AUTHENTICATE_PATH: &str = "/oauth/authenticate";
const ACCESS_TOKEN_PATH: &str = "/oauth/access_token";
const VERIFY_CREDENTIALS_PATH: &str = "/1.1/account/verify_credentials.json";

const HTTP_TIMEOUT_SECONDS: u64 = 10;

/// Result of starting a signin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigninOutcome {
    /// The session already holds token credentials.
    AlreadySignedIn,
    /// Send the user agent to the provider's authorization page.
    Redirect(String),
}

/// Subset of `verify_credentials.json` kept for the user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "id_str")]
    pub id: String,
    pub screen_name: String,
    #[serde(rename = "profile_image_url_https", default)]
    pub profile_image_url: String,
}

impl Account {
    #[must_use]
    pub fn into_user(self) -> User {
        User {
            user_id: self.id,
            display_name: self.screen_name,
            avatar_url: self.profile_image_url,
        }
    }
}

pub struct TwitterClient {
    oauth: OAuthClient,
    callback_url: String,
    request_token_url: Url,
    authenticate_url: Url,
    access_token_url: Url,
    verify_credentials_url: Url,
}

impl TwitterClient {
    /// # Errors
    /// Returns an error if an endpoint URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &TwitterConfig, callback_url: String) -> Result<Self> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECONDS))
            .build()
            .context("Error creating reqwest client")?;

        Ok(Self {
            oauth: OAuthClient::new(
                config.consumer_key().to_string(),
                config.consumer_secret().clone(),
                http,
            ),
            callback_url,
            request_token_url: config.endpoint(REQUEST_TOKEN_PATH)?,
            authenticate_url: config.endpoint(AUTHENTICATE_PATH)?,
            access_token_url: config.endpoint(ACCESS_TOKEN_PATH)?,
            verify_credentials_url: config.endpoint(VERIFY_CREDENTIALS_PATH)?,
        })
    }

    /// Start the handshake unless the session is already authenticated.
    ///
    /// On success the session is `PendingCallback` and has been saved.
    ///
    /// # Errors
    /// Returns [`AuthError::Transient`] if the provider or the store fails;
    /// the whole flow must then be retried.
    #[instrument(skip_all)]
    pub async fn begin_signin(
        &self,
        sessions: &SessionManager,
        jar: CookieJar,
        session: &mut Session,
    ) -> Result<(SigninOutcome, CookieJar), AuthError> {
        if session.is_logged_in() {
            return Ok((SigninOutcome::AlreadySignedIn, jar));
        }

        let temp = self
            .oauth
            .request_credentials(
                &self.request_token_url,
                None,
                &[("oauth_callback", self.callback_url.as_str())],
            )
            .await
            .map_err(|err| AuthError::transient("Error getting temp cred", err))?;

        let redirect_url = self.authorization_url(&temp.token);
        session.auth = SessionAuth::PendingCallback(temp);
        let jar = sessions.save(jar, session).await?;

        Ok((SigninOutcome::Redirect(redirect_url), jar))
    }

    /// Exchange the parked temporary credentials for token credentials.
    ///
    /// The session is replaced by a new record with the same identifier,
    /// token credentials set and no user id.
    ///
    /// # Errors
    /// Returns [`AuthError::Validation`] if `oauth_token` does not match the
    /// parked temporary token, [`AuthError::Transient`] if the exchange or the
    /// store fails.
    #[instrument(skip_all)]
    pub async fn complete_callback(
        &self,
        sessions: &SessionManager,
        jar: CookieJar,
        session: &mut Session,
        oauth_token: &str,
        oauth_verifier: &str,
    ) -> Result<CookieJar, AuthError> {
        let temp = match session.temporary_credentials() {
            Some(temp) if !oauth_token.is_empty() && temp.token == oauth_token => temp.clone(),
            _ => return Err(AuthError::Validation("Unknown oauth_token".to_string())),
        };

        let token = self
            .oauth
            .request_credentials(
                &self.access_token_url,
                Some(&temp),
                &[("oauth_verifier", oauth_verifier)],
            )
            .await
            .map_err(|err| AuthError::transient("Error getting request token", err))?;

        *session = Session {
            id: session.id.take(),
            user_id: None,
            auth: SessionAuth::Authenticated(token),
        };
        sessions.save(jar, session).await
    }

    /// Look up the account behind the session's token credentials.
    ///
    /// `Ok(None)` when the session is not authenticated.
    ///
    /// # Errors
    /// Returns [`AuthError::Transient`] on transport failure or a provider
    /// 5xx, [`AuthError::Validation`] on any other non-success status or an
    /// undecodable body.
    #[instrument(skip_all)]
    pub async fn fetch_identity(&self, session: &Session) -> Result<Option<Account>, AuthError> {
        let Some(token) = session.token_credentials() else {
            return Ok(None);
        };

        let response = self
            .oauth
            .get(&self.verify_credentials_url, token)
            .await
            .map_err(|err| AuthError::transient("Error getting user info", err))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(AuthError::transient(
                "Error getting user info",
                anyhow!("Twitter is unavailable: {status}"),
            ));
        }
        if !status.is_success() {
            return Err(AuthError::Validation(format!(
                "Twitter rejected the request: {status}"
            )));
        }

        let account = response
            .json::<Account>()
            .await
            .map_err(|err| AuthError::Validation(format!("Invalid Twitter account: {err}")))?;
        debug!("Fetched Twitter account {}", account.id);

        Ok(Some(account))
    }

    fn authorization_url(&self, temp_token: &str) -> String {
        let mut url = self.authenticate_url.clone();
        url.query_pairs_mut().append_pair("oauth_token", temp_token);
        url.to_string()
    }
}
