//! Session and user records.
//!
//! The persisted session row is flat (temporary and token credentials side by
//! side), while [`Session`] carries the OAuth leg as a sum type so a session can
//! never hold both credential pairs at once.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An OAuth 1.0a token/secret pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub secret: String,
}

impl Credentials {
    #[must_use]
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
        }
    }

    fn from_parts(token: Option<String>, secret: Option<String>) -> Option<Self> {
        match (token, secret) {
            (Some(token), Some(secret)) if !token.is_empty() && !secret.is_empty() => {
                Some(Self { token, secret })
            }
            _ => None,
        }
    }
}

/// Where a session is in the three-legged handshake.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionAuth {
    #[default]
    Anonymous,
    /// Temporary credentials issued, waiting for the provider callback.
    PendingCallback(Credentials),
    /// Long-lived token credentials.
    Authenticated(Credentials),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    /// `None` until the session manager mints an identifier.
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub auth: SessionAuth,
}

impl Session {
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        matches!(self.auth, SessionAuth::Authenticated(_))
    }

    #[must_use]
    pub fn temporary_credentials(&self) -> Option<&Credentials> {
        match &self.auth {
            SessionAuth::PendingCallback(credentials) => Some(credentials),
            _ => None,
        }
    }

    #[must_use]
    pub fn token_credentials(&self) -> Option<&Credentials> {
        match &self.auth {
            SessionAuth::Authenticated(credentials) => Some(credentials),
            _ => None,
        }
    }

    /// Flatten into the persisted row shape.
    ///
    /// Returns `None` when the session has no identifier yet.
    #[must_use]
    pub fn to_record(&self) -> Option<SessionRecord> {
        let session_id = self.id.clone()?;
        let mut record = SessionRecord {
            session_id,
            user_id: self.user_id.clone(),
            ..SessionRecord::default()
        };
        match &self.auth {
            SessionAuth::Anonymous => {}
            SessionAuth::PendingCallback(credentials) => {
                record.temp_token = Some(credentials.token.clone());
                record.temp_secret = Some(credentials.secret.clone());
            }
            SessionAuth::Authenticated(credentials) => {
                record.token = Some(credentials.token.clone());
                record.secret = Some(credentials.secret.clone());
            }
        }
        Some(record)
    }
}

/// Row stored in the session table.
#[derive(Clone, Debug, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct SessionRecord {
    pub session_id: String,
    pub user_id: Option<String>,
    pub temp_token: Option<String>,
    pub temp_secret: Option<String>,
    pub token: Option<String>,
    pub secret: Option<String>,
}

impl SessionRecord {
    /// An anonymous record that keeps only the identifier.
    #[must_use]
    pub fn anonymous(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            ..Self::default()
        }
    }
}

impl From<SessionRecord> for Session {
    fn from(record: SessionRecord) -> Self {
        // Token credentials win; leftover temporary fields are dropped.
        let auth = if let Some(credentials) = Credentials::from_parts(record.token, record.secret)
        {
            SessionAuth::Authenticated(credentials)
        } else if let Some(credentials) =
            Credentials::from_parts(record.temp_token, record.temp_secret)
        {
            SessionAuth::PendingCallback(credentials)
        } else {
            SessionAuth::Anonymous
        };

        Self {
            id: Some(record.session_id),
            user_id: record.user_id.filter(|user_id| !user_id.is_empty()),
            auth,
        }
    }
}

/// Profile persisted after every successful login (last login wins).
#[derive(ToSchema, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub display_name: String,
    pub avatar_url: String,
}
