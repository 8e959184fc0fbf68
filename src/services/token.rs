//! Signed, time-bound bearer tokens.
//!
//! HS256 JWTs carrying the subject id and email. The signing secret is
//! injected by the caller; there is no process-wide key. No revocation list
//! and no refresh flow: a token is valid until its signature or expiry
//! check fails.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Tokens expire after 24 hours.
const TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

/// Claims embedded in every issued token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: i64,
    pub email: String,
    /// Issued-at (Unix seconds).
    pub iat: u64,
    /// Expiry (Unix seconds).
    pub exp: u64,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Issue a signed token for the given subject.
pub fn issue(secret: &str, user_id: i64, email: &str) -> Result<String, Error> {
    let now = unix_now();
    let claims = Claims {
        sub: user_id,
        email: email.to_owned(),
        iat: now,
        exp: now + TOKEN_TTL_SECS,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify signature and expiry, returning the decoded claims.
pub fn verify(secret: &str, token: &str) -> Result<Claims, Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}
