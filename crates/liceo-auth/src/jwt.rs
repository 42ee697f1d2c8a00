//! Non-authoritative JWT payload inspection.
//!
//! Decodes the payload segment without verifying the signature, solely to
//! schedule refreshes and pre-empt tokens that are about to expire. The
//! server remains the only authority on token validity; nothing here may
//! feed an access-control decision.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

/// Time before the `exp` claim at which a token already counts as expired
/// (1 minute in milliseconds). Guards against a token expiring mid-request.
const EXPIRY_BUFFER_MS: u64 = 60 * 1000;

/// The claims this client reads. Everything else in the payload is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// Expiry, seconds since the Unix epoch.
    pub exp: Option<u64>,
}

/// Decode the payload segment of a JWT.
///
/// Returns `None` unless the token has exactly three dot-separated
/// segments and the middle one is base64url-encoded JSON.
pub fn decode_payload(token: &str) -> Option<Claims> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Whether a token should be treated as expired.
///
/// Malformed tokens and tokens without an `exp` claim read as expired, so
/// callers proceed to refresh or re-authenticate instead of failing.
pub fn is_token_expired(token: &str) -> bool {
    let Some(exp) = decode_payload(token).and_then(|claims| claims.exp) else {
        return true;
    };
    now_millis() >= exp.saturating_mul(1000).saturating_sub(EXPIRY_BUFFER_MS)
}

/// Expiry of a token in epoch milliseconds.
///
/// `None` when the payload cannot be decoded or carries no `exp` claim.
pub fn token_expiration(token: &str) -> Option<u64> {
    decode_payload(token)
        .and_then(|claims| claims.exp)
        .map(|exp| exp.saturating_mul(1000))
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}
