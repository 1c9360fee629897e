//! Cookie-backed sessions.
//!
//! The `session` cookie carries only an opaque identifier; the record lives in
//! the [`SessionStore`]. Nothing is cached between requests.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, error};

use super::{
    error::AuthError,
    models::{Session, SessionRecord},
    state::AuthConfig,
    storage::SessionStore,
    utils::{generate_session_id, valid_session_id},
};

pub const SESSION_COOKIE_NAME: &str = "session";

/// Far-future expiry (2128-06-11); sessions only end when the record is reset.
const SESSION_COOKIE_EXPIRES_UNIX: i64 = 5_000_000_000;

#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    cookie_domain: Option<String>,
    cookie_secure: bool,
}

impl SessionManager {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, config: &AuthConfig) -> Self {
        Self {
            store,
            cookie_domain: config.cookie_domain().map(ToString::to_string),
            cookie_secure: config.session_cookie_secure(),
        }
    }

    /// Resolve the request cookie into a session.
    ///
    /// Never fails: a missing cookie, an unknown identifier or a store error
    /// all yield the anonymous session.
    pub async fn load(&self, jar: &CookieJar) -> Session {
        let Some(session_id) = session_cookie_value(jar) else {
            return Session::default();
        };
        if !valid_session_id(&session_id) {
            debug!("Ignoring malformed session cookie");
            return Session::default();
        }
        match self.store.get_session(&session_id).await {
            Ok(Some(record)) => Session::from(record),
            Ok(None) => {
                debug!("No stored session for {session_id}, returning anonymous session");
                Session::default()
            }
            Err(err) => {
                error!("Failed to lookup session: {err:#}");
                Session::default()
            }
        }
    }

    /// Persist the session, minting a new identifier and cookie when the
    /// request cookie does not belong to it.
    ///
    /// Exactly one store write per call.
    ///
    /// # Errors
    /// Returns [`AuthError::Transient`] if the random source or the store fails.
    pub async fn save(&self, jar: CookieJar, session: &mut Session) -> Result<CookieJar, AuthError> {
        let cookie_matches = match (session_cookie_value(&jar), session.id.as_deref()) {
            (Some(cookie), Some(id)) => cookie == id,
            _ => false,
        };

        if cookie_matches {
            self.put(session).await?;
            return Ok(jar);
        }

        let session_id = generate_session_id()
            .map_err(|err| AuthError::transient("Error saving session", err))?;
        session.id = Some(session_id.clone());
        self.put(session).await?;

        Ok(jar.add(self.session_cookie(session_id)))
    }

    /// Overwrite a stored session with an anonymous record under the same id.
    ///
    /// # Errors
    /// Returns [`AuthError::Transient`] if the store write fails.
    pub async fn reset(&self, session_id: &str) -> Result<(), AuthError> {
        self.store
            .put_session(&SessionRecord::anonymous(session_id))
            .await
            .map_err(|err| AuthError::transient("Error saving session", err))
    }

    async fn put(&self, session: &Session) -> Result<(), AuthError> {
        let record = session.to_record().ok_or_else(|| {
            AuthError::transient(
                "Error saving session",
                anyhow::anyhow!("session has no identifier"),
            )
        })?;
        self.store
            .put_session(&record)
            .await
            .map_err(|err| AuthError::transient("Error saving session", err))
    }

    fn session_cookie(&self, session_id: String) -> Cookie<'static> {
        let mut builder = Cookie::build((SESSION_COOKIE_NAME, session_id))
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure);
        if let Some(domain) = &self.cookie_domain {
            builder = builder.domain(domain.clone());
        }
        if let Ok(expires) = OffsetDateTime::from_unix_timestamp(SESSION_COOKIE_EXPIRES_UNIX) {
            builder = builder.expires(expires);
        }
        builder.build()
    }
}

fn session_cookie_value(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|value| !value.is_empty())
}
