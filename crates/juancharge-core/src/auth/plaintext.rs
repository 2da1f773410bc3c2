//! Plaintext file backend for platforms without a usable keychain.
//!
//! All keys live in one JSON object at `<data_dir>/credentials.json`. Writes
//! are serialized through a mutex and land via write-to-temp then rename, so
//! a reader never sees a half-written file. The file is owner-only on Unix,
//! but it is not encrypted.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::backend::{BackendKind, StorageBackend, StoreError};

/// Credentials file name in the data directory
const CREDENTIALS_FILE: &str = "credentials.json";

static PLAINTEXT_WARNING: Once = Once::new();
static PLAINTEXT_WARNINGS_LOGGED: AtomicUsize = AtomicUsize::new(0);

/// How many times the plaintext warning has been logged in this process.
pub fn plaintext_warnings_logged() -> usize {
    PLAINTEXT_WARNINGS_LOGGED.load(Ordering::SeqCst)
}

pub struct PlaintextBackend {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl PlaintextBackend {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let path = data_dir.as_ref().join(CREDENTIALS_FILE);
        PLAINTEXT_WARNING.call_once(|| {
            warn!(
                path = %path.display(),
                "Secure storage unavailable - credentials are stored in plaintext (NOT SECURE for production)"
            );
            PLAINTEXT_WARNINGS_LOGGED.fetch_add(1, Ordering::SeqCst);
        });
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&contents) {
            Ok(values) => Ok(values),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Unreadable credentials file, treating as empty");
                Ok(BTreeMap::new())
            }
        }
    }

    async fn save(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(values).map_err(|source| StoreError::Serialize {
            key: "credentials file",
            source,
        })?;

        let tmp = self.path.with_extension("json.tmp");
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&tmp).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), keys = values.len(), "Credentials file written");
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for PlaintextBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Plaintext
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut values = self.load().await?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut values = self.load().await?;
        if values.remove(key).is_some() {
            self.save(&values).await?;
        }
        Ok(())
    }
}
