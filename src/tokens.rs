//! Access token value type.

use std::{
    fmt,
    time::{Duration, SystemTime},
};

use veil::Redact;

use crate::claims::{self, Claims};

/// A bearer credential for the Ponix backend.
///
/// Carries the opaque token string plus the claims decoded from it, when the
/// payload was decodable. The token itself is redacted from `Debug` output.
#[derive(Clone, Eq, PartialEq, Redact)]
pub struct AccessToken {
    #[redact]
    raw: String,
    claims: Option<Claims>,
}

impl AccessToken {
    /// Wraps a raw token string, decoding its claims on a best-effort basis.
    ///
    /// An undecodable payload leaves [`claims`](Self::claims) empty; the
    /// token remains usable as an opaque bearer credential.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let claims = match claims::decode(&raw) {
            Ok(claims) => Some(claims),
            Err(e) => {
                debug!("access token claims undecodable: {e}");
                None
            }
        };

        Self { raw, claims }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn claims(&self) -> Option<&Claims> {
        self.claims.as_ref()
    }

    /// Expiry from the token claims, when known.
    #[must_use]
    pub fn expires_at(&self) -> Option<SystemTime> {
        self.claims.as_ref().map(|claims| claims.exp)
    }

    /// Remaining lifetime of the token.
    ///
    /// A token without decodable claims reports zero: its expiry is unknown,
    /// so it is due for renewal immediately.
    #[must_use]
    pub fn time_to_live(&self) -> Duration {
        self.expires_at().map_or(Duration::ZERO, |expires_at| {
            expires_at
                .duration_since(SystemTime::now())
                .unwrap_or(Duration::ZERO)
        })
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.time_to_live() == Duration::ZERO
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
