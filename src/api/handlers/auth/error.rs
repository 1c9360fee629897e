//! Error kinds for the login flow.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The provider has no identity for the session.
    #[error("not found")]
    NotFound,
    /// Transport failure talking to the identity provider or the store.
    #[error("{message}")]
    Transient {
        message: String,
        #[source]
        source: anyhow::Error,
    },
    /// Rejected input, such as a callback for an unknown temporary token.
    #[error("{0}")]
    Validation(String),
}

impl AuthError {
    /// Wrap a transport failure, keeping the full cause chain in the message.
    pub fn transient(context: &str, source: anyhow::Error) -> Self {
        Self::Transient {
            message: format!("{context}, {source:#}"),
            source,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "message": "404" }))).into_response()
            }
            Self::Transient { message, .. } => {
                error!("{message}");
                (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
            Self::Validation(message) => {
                warn!("{message}");
                (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
        }
    }
}
