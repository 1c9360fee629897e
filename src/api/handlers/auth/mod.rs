//! Twitter login and cookie sessions.
//!
//! A session moves `Anonymous` -> `PendingCallback` -> `Authenticated` across
//! the OAuth 1.0a legs and is persisted after every step. The cookie only
//! carries the session identifier.
//!
//! ## Session Store
//!
//! Records live in a key-value table keyed by session id, next to a user
//! table keyed by the provider's user id. Writes replace the whole record and
//! the last write wins; concurrent requests with the same cookie are not
//! serialized.

mod error;
mod models;
mod oauth1;
mod session;
mod state;
mod storage;
mod twitter;
mod utils;

pub use error::AuthError;
pub use models::{Credentials, Session, SessionAuth, SessionRecord, User};
pub use session::{SESSION_COOKIE_NAME, SessionManager};
pub use state::{AuthConfig, AuthState, TwitterConfig};
pub use storage::{MemorySessionStore, PgSessionStore, SessionStore};
pub use twitter::{Account, SigninOutcome, TwitterClient};
