//! Login, registration, logout and the splash-screen session check.
//!
//! `SessionManager` is the only writer of a complete credential set; the API
//! client only ever refreshes the API token (and its expiry) on auto-login.

use tracing::{debug, info, warn};

use super::store::{CredentialKey, CredentialStore};
use crate::api::{ApiClient, ApiError, ApiRequest};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, User};

const LOGIN_PATH: &str = "/login";
const REGISTER_PATH: &str = "/register";
const LOGOUT_PATH: &str = "/logout";
const PROFILE_PATH: &str = "/profile";

/// Session state derived from the store: authenticated iff an API token is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

impl SessionState {
    pub fn is_authenticated(self) -> bool {
        matches!(self, SessionState::Authenticated)
    }
}

#[derive(Clone)]
pub struct SessionManager {
    api: ApiClient,
}

impl SessionManager {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn store(&self) -> &CredentialStore {
        self.api.store()
    }

    /// Current state, read from the store.
    pub async fn state(&self) -> Result<SessionState, ApiError> {
        Ok(if self.store().is_authenticated().await? {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        })
    }

    /// Sign in with email and password and persist the issued credentials.
    pub async fn login(&self, request: &LoginRequest) -> Result<User, ApiError> {
        let response: AuthResponse = self
            .api
            .send_anonymous_json(&ApiRequest::post(LOGIN_PATH).json(request)?)
            .await?;
        let user = self.persist(response).await?;
        info!(user = %user.display_name(), "Logged in");
        Ok(user)
    }

    /// Create an account and persist the issued credentials.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        let response: AuthResponse = self
            .api
            .send_anonymous_json(&ApiRequest::post(REGISTER_PATH).json(request)?)
            .await?;
        let user = self.persist(response).await?;
        info!(user = %user.display_name(), "Registered");
        Ok(user)
    }

    async fn persist(&self, response: AuthResponse) -> Result<User, ApiError> {
        if !response.success {
            return Err(ApiError::Rejected(
                response.message.unwrap_or_else(|| "login refused".to_string()),
            ));
        }

        let device_token = response
            .device_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::InvalidResponse("auth response has no device_token".to_string()))?;
        let api_token = response
            .api_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::InvalidResponse("auth response has no api_token".to_string()))?;
        let user = response.user.unwrap_or_default();

        let store = self.store();
        // A stale expiry from an earlier session must not outlive this login
        store.remove(CredentialKey::TokenExpiresAt).await?;
        store.set_device_token(&device_token).await?;
        store.set_api_token(&api_token).await?;
        store.set_user_data(&user).await?;
        if let Some(ref expires_at) = response.token_expires_at {
            store.set_token_expires_at_raw(expires_at).await?;
        }
        Ok(user)
    }

    /// Sign out. The server call is best effort; local credentials are
    /// cleared whatever it returns.
    pub async fn logout(&self) -> Result<(), ApiError> {
        if let Some(token) = self.store().api_token().await? {
            let request = ApiRequest::post(LOGOUT_PATH);
            if let Err(e) = self.api.send_with_token(&request, Some(&token)).await {
                warn!(error = %e, "Server logout failed, clearing local session anyway");
            }
        }

        let report = self.store().clear_all().await;
        if !report.is_clean() {
            warn!(failed = report.failed.len(), "Logout left some credentials behind");
        }
        info!("Logged out");
        Ok(())
    }

    /// The splash-screen check: resume a stored session if one is usable.
    ///
    /// Without valid credentials the state is `Anonymous`. With a valid
    /// device token but no API token, an auto-login is attempted; if it
    /// fails the leftovers are cleared.
    pub async fn restore(&self) -> Result<SessionState, ApiError> {
        let store = self.store();
        if !store.has_valid_credentials().await? {
            debug!("No resumable session");
            if store.is_authenticated().await? {
                // Expired device session with an API token still lying around
                store.clear_all().await;
            }
            return Ok(SessionState::Anonymous);
        }

        if store.is_authenticated().await? {
            return Ok(SessionState::Authenticated);
        }

        match self.api.auto_login().await {
            Ok(_) => Ok(SessionState::Authenticated),
            Err(e @ ApiError::NetworkError(_)) => {
                // Offline at launch: keep the device token for the next attempt
                warn!(error = %e, "Could not reach server to resume session");
                Ok(SessionState::Anonymous)
            }
            Err(e) => {
                warn!(error = %e, "Stored device session rejected, clearing");
                store.clear_all().await;
                Ok(SessionState::Anonymous)
            }
        }
    }

    /// Fetch the profile through the interceptor and refresh the cached copy.
    pub async fn profile(&self) -> Result<User, ApiError> {
        let user: User = self.api.get(PROFILE_PATH).await?;
        self.store().set_user_data(&user).await?;
        Ok(user)
    }

    /// Cached profile, if any. Never authoritative.
    pub async fn cached_user(&self) -> Result<Option<User>, ApiError> {
        Ok(self.store().user_data().await?)
    }
}
