//! # WCS (Watercolor Site API)
//!
//! `wcs` is the backend of the painting site. This crate covers signing in
//! with Twitter and keeping the visitor's session in a cookie.
//!
//! ## Sessions
//!
//! The `session` cookie only carries a random 32 hex character identifier.
//! Everything else lives in the session store: the OAuth credentials of the
//! current handshake step and the id of the signed-in user.
//!
//! - **Fail open:** an unreadable or unknown cookie yields an anonymous
//!   session, never an error.
//! - **Rotation:** a session is written under a fresh identifier unless the
//!   request cookie already names it.
//!
//! ## Authentication (OAuth 1.0a)
//!
//! Signin is the three-legged Twitter flow. Temporary credentials are parked
//! in the session until the provider redirects back with a matching
//! `oauth_token`; they are then exchanged for token credentials and the
//! account profile is stored as the site user.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
