//! HTTP transport for the Ponix backend.
//!
//! This module provides a wrapper around `reqwest::Client` that adds:
//! * Cookie management, so the server-managed refresh credential (an
//!   HTTP-only cookie) accompanies every request transparently
//! * Bearer authorization from a [`TokenSource`] on every call
//! * The Connect unary calling convention (JSON `POST`, wire error bodies)
//!
//! # Authorization
//!
//! The transport does not own the access token. It holds a [`TokenSource`],
//! a capability handed out by the session manager at composition time, and
//! reads it synchronously while building each request. The session manager
//! updates the source in the same call in which it stores a new session, so
//! a request issued immediately after a successful login or refresh is
//! authorized with the new token; there is no window in which a stale or
//! absent token is observed.

use std::{
    sync::{Arc, PoisonError, RwLock},
    time::Duration,
};

use reqwest::{self, Url};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::Config,
    error::{Error, ErrorKind, Result},
    protocol::ErrorBody,
    tokens::AccessToken,
};

/// Synchronously readable slot holding the current access token.
///
/// Shared between the session manager (the only writer) and every transport
/// that needs to authorize outbound calls. Reads reflect the most recent
/// store immediately; there is no deferred propagation.
#[derive(Clone, Debug, Default)]
pub struct TokenSource {
    current: Arc<RwLock<Option<AccessToken>>>,
}

impl TokenSource {
    /// Returns the current access token, if a session is established.
    #[must_use]
    pub fn current(&self) -> Option<AccessToken> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the current token. Session manager only.
    pub(crate) fn store(&self, token: Option<AccessToken>) {
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }
}

/// HTTP client with cookie support and bearer authorization.
#[derive(Clone)]
pub struct Client {
    /// Direct access to the underlying client.
    pub inner: reqwest::Client,

    tokens: TokenSource,
}

impl Client {
    /// Duration to keep idle connections alive.
    ///
    /// Prevents frequent reconnection overhead for subsequent requests.
    const KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Creates a new transport.
    ///
    /// The client carries a private cookie jar. The backend sets the
    /// long-lived refresh credential on it during login and reads it back on
    /// every call, which is what makes silent refresh work without any
    /// client-side storage of that credential.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the HTTP client cannot be constructed.
    pub fn new(config: &Config, tokens: TokenSource) -> Result<Self> {
        let cookie_jar = Arc::new(reqwest::cookie::Jar::default());

        let inner = reqwest::Client::builder()
            .cookie_provider(cookie_jar)
            .tcp_keepalive(Self::KEEPALIVE_TIMEOUT)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { inner, tokens })
    }

    /// Performs a Connect unary call.
    ///
    /// Serializes `request` as the JSON body of a `POST` to `url`, attaching
    /// `Authorization: Bearer <token>` when a token is present. Non-2xx
    /// responses are decoded from the Connect error body into an [`Error`]
    /// of the matching kind; responses without a parseable body fall back to
    /// a kind derived from the HTTP status.
    ///
    /// # Errors
    ///
    /// Will return `Err` if:
    /// - the request cannot reach the backend
    /// - the backend answers with a failure status
    /// - the response body cannot be parsed as `Resp`
    pub async fn rpc<Req, Resp>(&self, url: Url, request: &Req) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let mut builder = self.inner.post(url).json(request);

        if let Some(token) = self.tokens.current() {
            builder = builder.bearer_auth(token.as_str());
        }

        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return response.json::<Resp>().await.map_err(Into::into);
        }

        let body = response.bytes().await.unwrap_or_default();
        Err(match serde_json::from_slice::<ErrorBody>(&body) {
            Ok(wire) => Error::new(
                ErrorKind::from_wire(&wire.code).unwrap_or(ErrorKind::Unknown),
                wire.message,
            ),
            Err(_) => Error::new(
                ErrorKind::from_status(status),
                format!("backend answered {status}"),
            ),
        })
    }
}
