//! Wire types for the Ponix backend RPC surface.
//!
//! The backend speaks the Connect protocol: unary calls are JSON `POST`s to
//! `/{package}.{Service}/{Method}` with camel-cased field names. Only the
//! messages the console consumes are modeled here; resource services
//! (organizations, workspaces, gateways, end devices) have their own
//! generated clients and are out of scope for this crate.

use serde::Deserialize;

pub mod users;

/// Error body of a failed Connect call.
///
/// ```json
/// { "code": "unauthenticated", "message": "refresh credential expired" }
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct ErrorBody {
    /// Snake-cased wire code, see [`ErrorKind::from_wire`].
    ///
    /// [`ErrorKind::from_wire`]: crate::error::ErrorKind::from_wire
    pub code: String,

    /// Human-readable description, surfaced verbatim to callers.
    #[serde(default)]
    pub message: String,
}
