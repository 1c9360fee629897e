//! API handlers for the watercolor site.
//!
//! `auth` holds the session and Twitter login machinery; the remaining modules
//! are the thin axum handlers in front of it.

pub mod auth;
pub mod health;
pub mod login;
pub mod root;
pub mod user;
