//! The credential store shared by the API client and the route guard.
//!
//! `CredentialStore` implements the four-key contract once on top of any
//! `StorageBackend`, so callers never see which backend is active. Clone is
//! cheap and every clone talks to the same backend.

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::backend::{BackendKind, StorageBackend, StoreError};
use super::keychain::KeyringBackend;
use super::memory::MemoryBackend;
use super::plaintext::PlaintextBackend;
use crate::config::{Config, StorageMode, APP_NAME};

/// The four persisted session fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    DeviceToken,
    ApiToken,
    UserData,
    TokenExpiresAt,
}

impl CredentialKey {
    pub const ALL: [CredentialKey; 4] = [
        CredentialKey::DeviceToken,
        CredentialKey::ApiToken,
        CredentialKey::UserData,
        CredentialKey::TokenExpiresAt,
    ];

    /// Storage key name, shared by every backend.
    pub fn as_str(self) -> &'static str {
        match self {
            CredentialKey::DeviceToken => "device_token",
            CredentialKey::ApiToken => "api_token",
            CredentialKey::UserData => "user_data",
            CredentialKey::TokenExpiresAt => "token_expires_at",
        }
    }
}

impl std::fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of `clear_all`: the keys whose removal failed, if any.
#[derive(Debug, Default)]
pub struct ClearReport {
    pub failed: Vec<(CredentialKey, String)>,
}

impl ClearReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn StorageBackend>,
}

impl CredentialStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Pick the backend once at startup.
    ///
    /// The keychain is used when the target has one and the probe succeeds;
    /// otherwise the plaintext file under `Config::data_dir` is used.
    pub async fn detect(config: &Config) -> Result<Self, StoreError> {
        if config.storage != StorageMode::Plaintext {
            if KeyringBackend::platform_supported() {
                match KeyringBackend::probe(APP_NAME).await {
                    Ok(backend) => {
                        info!(backend = %BackendKind::Keychain, "Credential store ready");
                        return Ok(Self::new(Arc::new(backend)));
                    }
                    Err(e) => {
                        warn!(error = %e, "Keychain probe failed, falling back to plaintext storage");
                    }
                }
            } else {
                debug!("No native keychain on this target");
            }
        }

        let backend = PlaintextBackend::new(config.data_dir()?);
        info!(backend = %BackendKind::Plaintext, path = %backend.path().display(), "Credential store ready");
        Ok(Self::new(Arc::new(backend)))
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    // ===== Generic access =====

    pub async fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError> {
        self.backend.set(key.as_str(), value).await
    }

    /// Returns `Ok(None)` for a key that was never set.
    pub async fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError> {
        self.backend.get(key.as_str()).await
    }

    pub async fn remove(&self, key: CredentialKey) -> Result<(), StoreError> {
        self.backend.remove(key.as_str()).await
    }

    /// Read a token, treating an empty string as absent.
    async fn token(&self, key: CredentialKey) -> Result<Option<String>, StoreError> {
        Ok(self.get(key).await?.filter(|value| !value.is_empty()))
    }

    // ===== Device token =====

    pub async fn set_device_token(&self, token: &str) -> Result<(), StoreError> {
        self.set(CredentialKey::DeviceToken, token).await
    }

    pub async fn device_token(&self) -> Result<Option<String>, StoreError> {
        self.token(CredentialKey::DeviceToken).await
    }

    // ===== API token =====

    pub async fn set_api_token(&self, token: &str) -> Result<(), StoreError> {
        self.set(CredentialKey::ApiToken, token).await
    }

    pub async fn api_token(&self) -> Result<Option<String>, StoreError> {
        self.token(CredentialKey::ApiToken).await
    }

    // ===== User data =====

    pub async fn set_user_data<T: Serialize>(&self, user: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(user).map_err(|source| StoreError::Serialize {
            key: CredentialKey::UserData.as_str(),
            source,
        })?;
        self.set(CredentialKey::UserData, &json).await
    }

    /// Cached user profile. A value that no longer parses reads as absent.
    pub async fn user_data<T: DeserializeOwned>(&self) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.get(CredentialKey::UserData).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(error = %e, "Stored user data is malformed, ignoring");
                Ok(None)
            }
        }
    }

    // ===== Token expiry =====

    pub async fn set_token_expires_at(&self, expires_at: DateTime<Utc>) -> Result<(), StoreError> {
        self.set(CredentialKey::TokenExpiresAt, &expires_at.to_rfc3339())
            .await
    }

    /// Store expiry text exactly as the server sent it.
    pub async fn set_token_expires_at_raw(&self, expires_at: &str) -> Result<(), StoreError> {
        self.set(CredentialKey::TokenExpiresAt, expires_at).await
    }

    /// Raw expiry text as stored; see `has_valid_credentials` for how it is read.
    pub async fn token_expires_at(&self) -> Result<Option<String>, StoreError> {
        self.token(CredentialKey::TokenExpiresAt).await
    }

    // ===== Session-wide operations =====

    /// Remove all four keys. Every key is attempted; failures are logged and
    /// reported, never returned as an error.
    pub async fn clear_all(&self) -> ClearReport {
        let mut report = ClearReport::default();
        for key in CredentialKey::ALL {
            if let Err(e) = self.remove(key).await {
                warn!(key = %key, error = %e, "Failed to clear credential");
                report.failed.push((key, e.to_string()));
            }
        }
        debug!(failed = report.failed.len(), "Cleared stored credentials");
        report
    }

    /// Whether a session can be resumed on this device.
    pub async fn has_valid_credentials(&self) -> Result<bool, StoreError> {
        self.has_valid_credentials_at(Utc::now()).await
    }

    /// As `has_valid_credentials`, against an explicit clock.
    ///
    /// False without a device token. True with a device token and no expiry.
    /// Otherwise valid only while `expires_at > now`: a token expiring at
    /// exactly `now` is expired, and unparseable expiry text is expired.
    pub async fn has_valid_credentials_at(&self, now: DateTime<Utc>) -> Result<bool, StoreError> {
        if self.device_token().await?.is_none() {
            return Ok(false);
        }

        let Some(raw) = self.token_expires_at().await? else {
            return Ok(true);
        };

        match parse_expiry(&raw) {
            Some(expires_at) => Ok(expires_at > now),
            None => {
                warn!(value = %raw, "Unparseable token expiry, treating as expired");
                Ok(false)
            }
        }
    }

    /// The session is authenticated exactly when an API token is stored.
    pub async fn is_authenticated(&self) -> Result<bool, StoreError> {
        Ok(self.api_token().await?.is_some())
    }
}

/// Read expiry text: RFC 3339, or a zone-less date-time taken as UTC.
fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}
