//! Session lifecycle for the console.
//!
//! The [`SessionManager`] owns the access token and the resolved user
//! identity for the lifetime of the process. It is the single writer of
//! session state; everything else observes it, either synchronously through
//! the [`TokenSource`] it shares with the transport, or asynchronously
//! through [`SessionManager::subscribe`].
//!
//! # Lifecycle
//!
//! The session starts empty and loading. [`SessionManager::start`] attempts
//! a silent refresh from the ambient refresh cookie; whatever the outcome,
//! the loading flag is cleared so route guards can settle. After that the
//! machine cycles between unauthenticated and authenticated through
//! [`login`], [`register`], [`logout`] and token renewal; there is no
//! terminal state.
//!
//! # Renewal
//!
//! A background task watches the session and sleeps until 60 seconds before
//! the current token's expiry, then re-runs the refresh flow. It re-arms on
//! every token change regardless of which flow produced it, renews
//! immediately when a token is installed with less than the threshold
//! remaining, and idles while no token is present. Overlapping refreshes
//! are tolerated: the session is always replaced whole, last writer wins.
//!
//! [`login`]: SessionManager::login
//! [`register`]: SessionManager::register
//! [`logout`]: SessionManager::logout

use std::{sync::Arc, time::Duration};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{
    auth::AuthClient,
    error::{Error, Result},
    http::TokenSource,
    protocol::users,
    tokens::AccessToken,
};

/// Resolved identity of the signed-in user.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl From<users::User> for SessionUser {
    fn from(user: users::User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

/// Observable session state.
///
/// `token` and `user` are cleared together; a session with only a token can
/// arise from a login whose user fetch failed and reports as not
/// authenticated.
#[derive(Clone, Debug)]
pub struct Session {
    pub token: Option<AccessToken>,
    pub user: Option<SessionUser>,

    /// True only while the initial silent refresh is in flight.
    pub loading: bool,
}

impl Session {
    /// True iff both the user and the access token are present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self {
            token: None,
            user: None,
            loading: true,
        }
    }
}

/// Owner of the session state machine.
///
/// Cheap to clone; all clones share the same state. Constructing a manager
/// spawns its renewal task, so construction must happen inside a tokio
/// runtime.
#[derive(Clone)]
pub struct SessionManager {
    auth: AuthClient,
    tokens: TokenSource,
    state: Arc<watch::Sender<Session>>,
    cancel: CancellationToken,
}

impl SessionManager {
    /// How long before token expiry a renewal is attempted.
    ///
    /// Renewing with a margin prevents authorized calls from failing with
    /// only a few seconds left on the clock. A token installed with less
    /// than this margin remaining is renewed immediately.
    const RENEWAL_THRESHOLD: Duration = Duration::from_secs(60);

    /// Creates a session manager over the given auth client.
    ///
    /// `tokens` must be the same [`TokenSource`] the transport was built
    /// with; the manager keeps it in lockstep with the session so outbound
    /// calls are authorized without any propagation delay.
    #[must_use]
    pub fn new(auth: AuthClient, tokens: TokenSource) -> Self {
        let (state, _) = watch::channel(Session::default());
        let manager = Self {
            auth,
            tokens,
            state: Arc::new(state),
            cancel: CancellationToken::new(),
        };

        manager.spawn_renewal();
        manager
    }

    /// Attempts to restore a session from the ambient refresh credential.
    ///
    /// Always clears the loading flag, whatever the outcome. Returns whether
    /// a session was established.
    pub async fn start(&self) -> bool {
        let restored = self.refresh_session().await;
        self.state.send_modify(|session| session.loading = false);

        if restored {
            info!("session restored from refresh credential");
        } else {
            debug!("no session to restore");
        }
        restored
    }

    /// Signs in with email and password.
    ///
    /// On success the new token is visible through the [`TokenSource`]
    /// before this method returns. If the token's claims cannot be decoded
    /// or the user fetch fails, the token is retained and the session is
    /// left unidentified (not authenticated); the failure propagates to the
    /// caller for display.
    ///
    /// # Errors
    ///
    /// Will return `Err` when the backend rejects the credentials or the
    /// subsequent user fetch fails.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let response = self.auth.login(email, password).await?;
        self.establish(response.token).await
    }

    /// Creates an account, then signs in with the same credentials.
    ///
    /// # Errors
    ///
    /// Will return `Err` when registration is rejected (e.g. the identity
    /// already exists) or when the follow-up login fails.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<()> {
        self.auth.register(email, password, name).await?;
        self.login(email, password).await
    }

    /// Signs out.
    ///
    /// The logout RPC is best-effort: the local session is cleared
    /// unconditionally, whatever the backend answered.
    ///
    /// # Errors
    ///
    /// Will return `Err` when the logout RPC failed; the session is cleared
    /// regardless.
    pub async fn logout(&self) -> Result<()> {
        let result = self.auth.logout().await;
        self.clear();

        result?;
        Ok(())
    }

    /// Replaces the session with a freshly minted token.
    ///
    /// Relies on the refresh cookie carried by the transport. On success the
    /// new token and user are installed and `true` is returned. Any failure
    /// (transport, undecodable claims, user fetch) clears the session and
    /// returns `false`; this method never surfaces an error, since it backs
    /// the silent startup refresh and the background renewal.
    pub async fn refresh_session(&self) -> bool {
        match self.try_refresh().await {
            Ok(()) => true,
            Err(e) => {
                debug!("session refresh failed: {e}");
                self.clear();
                false
            }
        }
    }

    /// The synchronous token accessor shared with the transport.
    #[must_use]
    pub fn token_source(&self) -> TokenSource {
        self.tokens.clone()
    }

    /// Subscribes to session changes, for UI re-rendering.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Stops the renewal task. The session state itself is left untouched.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Installs a token produced by login, then resolves its user.
    async fn establish(&self, raw: String) -> Result<()> {
        let token = AccessToken::from_raw(raw);

        // The authorizer must see the new token before any further call,
        // including the user fetch right below.
        self.tokens.store(Some(token.clone()));
        self.state.send_modify(|session| {
            session.token = Some(token.clone());
            session.user = None;
        });

        let Some(claims) = token.claims().cloned() else {
            // No usable claims: keep the bearer credential, leave the
            // identity unresolved until a later successful refresh.
            return Ok(());
        };

        let user = self.auth.get_user(&claims.sub).await?;
        info!("session established for user {}", user.id);
        self.state
            .send_modify(|session| session.user = Some(user.into()));

        Ok(())
    }

    async fn try_refresh(&self) -> Result<()> {
        let response = self.auth.refresh().await?;

        let token = AccessToken::from_raw(response.access_token);
        let claims = token
            .claims()
            .cloned()
            .ok_or_else(|| Error::invalid_argument("refreshed token has no usable claims"))?;

        // Authorize the user fetch with the new token already.
        self.tokens.store(Some(token.clone()));
        let user = self.auth.get_user(&claims.sub).await?;

        // Single commit: observers never see the token without its user.
        self.state.send_modify(|session| {
            session.token = Some(token);
            session.user = Some(user.into());
        });

        Ok(())
    }

    fn clear(&self) {
        self.tokens.store(None);
        self.state.send_modify(|session| {
            session.token = None;
            session.user = None;
        });
    }

    /// Spawns the proactive renewal task.
    ///
    /// The task re-arms whenever the session changes, so a timer armed for a
    /// replaced token never fires against the new one.
    fn spawn_renewal(&self) {
        let manager = self.clone();
        let cancel = self.cancel.clone();
        let mut state = self.state.subscribe();

        tokio::spawn(async move {
            loop {
                let deadline = {
                    let session = state.borrow_and_update();
                    session.token.as_ref().map(|token| {
                        tokio::time::Instant::now()
                            + token.time_to_live().saturating_sub(Self::RENEWAL_THRESHOLD)
                    })
                };

                tokio::select! {
                    () = cancel.cancelled() => break,
                    changed = state.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    () = renewal_wait(deadline) => {
                        if manager.refresh_session().await {
                            debug!("access token renewed");
                        } else {
                            warn!("access token renewal failed; session cleared");
                        }
                    }
                }
            }
        });
    }
}

/// Sleeps until the renewal deadline, or forever when no token is armed.
async fn renewal_wait(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
