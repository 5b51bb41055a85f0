//! Messages of `user.v1.UserService`.
//!
//! Credentials and minted tokens are redacted from `Debug` output; they end
//! up in trace logs otherwise.

use serde::{Deserialize, Serialize};
use veil::Redact;

/// A user record as returned by the backend.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Clone, Redact, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    #[redact]
    pub password: String,
}

#[derive(Clone, Deserialize, Redact)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Freshly minted access token.
    #[redact]
    pub token: String,
}

#[derive(Clone, Redact, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub email: String,
    #[redact]
    pub password: String,
    pub name: String,
}

/// Registration acknowledgement. The console logs in with the same
/// credentials right after, so the echoed record is unused.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserResponse {
    #[serde(default)]
    pub user: Option<User>,
}

/// Empty request: the refresh credential travels out-of-band as an
/// HTTP-only cookie.
#[derive(Clone, Debug, Serialize)]
pub struct RefreshRequest {}

#[derive(Clone, Deserialize, Redact)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// Replacement access token.
    #[redact]
    pub access_token: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct LogoutRequest {}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LogoutResponse {}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUserRequest {
    pub user_id: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUserResponse {
    #[serde(default)]
    pub user: Option<User>,
}
