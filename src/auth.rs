//! Client for the backend's `user.v1.UserService`.
//!
//! Thin typed wrapper over the transport: one method per RPC, request and
//! response shapes from [`protocol::users`]. The refresh call carries no
//! explicit credential; it is authenticated by the refresh cookie living in
//! the transport's jar.

use reqwest::Url;

use crate::{
    error::{Error, Result},
    http::Client as HttpClient,
    protocol::users,
};

#[derive(Clone)]
pub struct AuthClient {
    http: HttpClient,
    base: Url,
}

impl AuthClient {
    /// Service path prefix of every UserService method.
    const SERVICE: &'static str = "user.v1.UserService";

    #[must_use]
    pub fn new(http: HttpClient, base: Url) -> Self {
        Self { http, base }
    }

    fn endpoint(&self, method: &str) -> Result<Url> {
        format!(
            "{}/{}/{method}",
            self.base.as_str().trim_end_matches('/'),
            Self::SERVICE
        )
        .parse::<Url>()
        .map_err(Into::into)
    }

    /// Exchanges credentials for an access token.
    ///
    /// The backend also installs the long-lived refresh cookie on the
    /// response, enabling later silent refreshes.
    ///
    /// # Errors
    ///
    /// Will return `Err` with kind `Unauthenticated` when the credentials
    /// are rejected, or a transport error when the backend is unreachable.
    pub async fn login(&self, email: &str, password: &str) -> Result<users::LoginResponse> {
        debug!("logging in {email}");
        let request = users::LoginRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        };

        self.http.rpc(self.endpoint("Login")?, &request).await
    }

    /// Creates a new user account.
    ///
    /// # Errors
    ///
    /// Will return `Err` with kind `AlreadyExists` for a duplicate identity;
    /// the message is surfaced verbatim for display.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<users::RegisterUserResponse> {
        debug!("registering {email}");
        let request = users::RegisterUserRequest {
            email: email.to_owned(),
            password: password.to_owned(),
            name: name.to_owned(),
        };

        self.http
            .rpc(self.endpoint("RegisterUser")?, &request)
            .await
    }

    /// Mints a fresh access token from the ambient refresh credential.
    ///
    /// # Errors
    ///
    /// Will return `Err` when no usable refresh cookie is present or the
    /// backend is unreachable.
    pub async fn refresh(&self) -> Result<users::RefreshResponse> {
        self.http
            .rpc(self.endpoint("Refresh")?, &users::RefreshRequest {})
            .await
    }

    /// Invalidates the refresh credential server-side.
    ///
    /// # Errors
    ///
    /// Will return `Err` when the backend rejects the call; callers treat
    /// this as best-effort.
    pub async fn logout(&self) -> Result<users::LogoutResponse> {
        self.http
            .rpc(self.endpoint("Logout")?, &users::LogoutRequest {})
            .await
    }

    /// Fetches the user record for a token subject.
    ///
    /// # Errors
    ///
    /// Will return `Err` with kind `NotFound` when the backend answers
    /// without a user record.
    pub async fn get_user(&self, user_id: &str) -> Result<users::User> {
        let request = users::GetUserRequest {
            user_id: user_id.to_owned(),
        };

        let response: users::GetUserResponse =
            self.http.rpc(self.endpoint("GetUser")?, &request).await?;

        response
            .user
            .ok_or_else(|| Error::not_found(format!("no user record for {user_id}")))
    }
}
