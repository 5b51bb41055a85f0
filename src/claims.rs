//! Non-verifying decode of access token claims.
//!
//! Access tokens use the compact three-part encoding: a base64url header,
//! payload and signature joined by dots. The console only needs the subject
//! and expiry out of the payload, so it decodes the middle segment without
//! checking the signature. Authorization is enforced by the backend; the
//! claims here are trusted just enough to know *who* to fetch and *when* to
//! renew.
//!
//! Decode failure is not fatal to the session: a token without usable claims
//! is still a valid bearer credential, it just cannot be renewed proactively
//! or resolved to a user record.

use std::time::SystemTime;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Deserialize;
use serde_with::{formats::Flexible, serde_as, TimestampSeconds};

use crate::error::{Error, Result};

/// Claims extracted from an access token payload.
///
/// Only the fields the console consumes; everything else in the payload is
/// ignored.
#[serde_as]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Claims {
    /// Subject: the user id the token was minted for.
    pub sub: String,

    /// Email address, when the backend includes it.
    #[serde(default)]
    pub email: Option<String>,

    /// Expiry as epoch seconds.
    #[serde_as(as = "TimestampSeconds<i64, Flexible>")]
    pub exp: SystemTime,
}

/// Decodes the payload segment of a compact token into [`Claims`].
///
/// # Errors
///
/// Will return `Err` if:
/// - the token is not in three-part compact form
/// - the payload segment is not valid base64url
/// - the payload JSON is missing `sub` or `exp`
pub fn decode(token: &str) -> Result<Claims> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| Error::invalid_argument("token is not in compact form"))?;

    let bytes = URL_SAFE_NO_PAD.decode(payload)?;
    let claims = serde_json::from_slice(&bytes)?;

    Ok(claims)
}
