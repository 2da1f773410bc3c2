//! Platform keychain backend (macOS/iOS Keychain, Windows Credential Manager,
//! Secret Service backed by the kernel keyring on Linux).
//!
//! Each credential key is its own keyring entry under the app's service name.
//! Entries for the four session keys are opened once by `probe` and reused.
//! The `keyring` API is blocking, so every call runs on the blocking pool.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use keyring::Entry;
use tracing::{debug, trace};

use super::backend::{BackendKind, StorageBackend, StoreError};
use super::store::CredentialKey;

/// Entry used by the startup probe. Never written.
const PROBE_KEY: &str = "__probe__";

pub struct KeyringBackend {
    service: String,
    entries: HashMap<&'static str, Arc<Entry>>,
}

impl KeyringBackend {
    /// Whether this target has a native keychain `keyring` can talk to.
    pub fn platform_supported() -> bool {
        cfg!(any(
            target_os = "macos",
            target_os = "ios",
            target_os = "windows",
            target_os = "linux"
        ))
    }

    /// Probe the keychain by reading a sentinel entry, then open the
    /// session entries.
    ///
    /// A missing entry means the store answered and is usable; any other
    /// error (no keyring, locked store, access denied) means it is not.
    pub async fn probe(service: &str) -> Result<Self, StoreError> {
        let service = service.to_string();
        let probe_service = service.clone();
        let entries = tokio::task::spawn_blocking(
            move || -> Result<HashMap<&'static str, Arc<Entry>>, StoreError> {
                match Entry::new(&probe_service, PROBE_KEY)?.get_password() {
                    Ok(_) | Err(keyring::Error::NoEntry) => {}
                    Err(e) => return Err(e.into()),
                }
                CredentialKey::ALL
                    .iter()
                    .map(|key| -> Result<(&'static str, Arc<Entry>), StoreError> {
                        let entry = Entry::new(&probe_service, key.as_str())?;
                        Ok((key.as_str(), Arc::new(entry)))
                    })
                    .collect()
            },
        )
        .await??;

        debug!(service = %service, "Keychain available");
        Ok(Self { service, entries })
    }

    fn entry(&self, key: &str) -> Result<Arc<Entry>, StoreError> {
        if let Some(entry) = self.entries.get(key) {
            return Ok(entry.clone());
        }
        trace!(service = %self.service, key, "Opening keyring entry");
        Ok(Arc::new(Entry::new(&self.service, key)?))
    }
}

#[async_trait]
impl StorageBackend for KeyringBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Keychain
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entry = self.entry(key)?;
        tokio::task::spawn_blocking(move || -> Result<Option<String>, StoreError> {
            match entry.get_password() {
                Ok(value) => Ok(Some(value)),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await?
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let (entry, value) = (self.entry(key)?, value.to_string());
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            entry.set_password(&value)?;
            Ok(())
        })
        .await?
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let entry = self.entry(key)?;
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
        .await?
    }
}
