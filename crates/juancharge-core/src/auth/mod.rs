//! Authentication module for managing the device session and its credentials.
//!
//! This module provides:
//! - `CredentialStore`: the four-key credential contract (device token, API
//!   token, user data, token expiry) over a pluggable storage backend
//! - `KeyringBackend` / `PlaintextBackend` / `MemoryBackend`: the backends,
//!   chosen once at startup by `CredentialStore::detect`
//! - `SessionManager`: login, registration, logout and the splash-screen
//!   session check
//!
//! The session is authenticated exactly when an API token is stored.

pub mod backend;
pub mod keychain;
pub mod memory;
pub mod plaintext;
pub mod session;
pub mod store;

pub use backend::{BackendKind, StorageBackend, StoreError};
pub use keychain::KeyringBackend;
pub use memory::MemoryBackend;
pub use plaintext::PlaintextBackend;
pub use session::{SessionManager, SessionState};
pub use store::{ClearReport, CredentialKey, CredentialStore};
