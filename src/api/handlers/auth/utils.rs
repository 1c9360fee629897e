//! Small helpers for session identifiers and OAuth nonces.

use anyhow::{Context, Result};
use rand::{Rng, RngCore, distributions::Alphanumeric, rngs::OsRng};
use regex::Regex;

/// Bytes of randomness behind a session identifier.
const SESSION_ID_BYTES: usize = 16;

/// Create a new session identifier for the `session` cookie.
///
/// 128 bits from the OS random source, lowercase hex.
pub(crate) fn generate_session_id() -> Result<String> {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session id")?;
    Ok(hex::encode(bytes))
}

/// Cookie values that could never have been minted are not looked up.
pub(crate) fn valid_session_id(value: &str) -> bool {
    Regex::new(r"^[0-9a-f]{32}$").is_ok_and(|re| re.is_match(value))
}

/// Per-request OAuth nonce.
pub(super) fn generate_nonce() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}
