use async_trait::async_trait;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Keychain error: {0}")]
    Keychain(#[from] keyring::Error),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize {key}: {source}")]
    Serialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        StoreError::Task(err.to_string())
    }
}

/// Which storage variant is active. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Keychain,
    Plaintext,
    Memory,
}

impl BackendKind {
    pub fn is_secure(self) -> bool {
        matches!(self, BackendKind::Keychain)
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BackendKind::Keychain => "keychain",
            BackendKind::Plaintext => "plaintext",
            BackendKind::Memory => "memory",
        })
    }
}

/// Single-key text storage. Removing an absent key succeeds.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
