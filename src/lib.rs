//! Web console host and session client for the Ponix IoT platform.
//!
//! Two independent pieces, composed only at the network boundary: the
//! [`serve`] module hosts the built console bundle (MIME resolution,
//! immutable caching, SPA fallback), and the [`session`] module owns the
//! access-token lifecycle against the Ponix backend: silent refresh on
//! startup, proactive renewal before expiry, login/register/logout, and
//! synchronous bearer injection into every outbound RPC through
//! [`http::TokenSource`].

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[macro_use]
extern crate log;

pub mod auth;
pub mod claims;
pub mod config;
pub mod error;
pub mod http;
pub mod protocol;
pub mod serve;
pub mod session;
pub mod tokens;
