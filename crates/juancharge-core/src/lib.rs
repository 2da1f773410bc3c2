//! Core library for the JuanCharge mobile client session subsystem.
//!
//! This crate provides:
//! - `auth`: the credential store, its storage backends and the session flows
//! - `api`: the REST client that attaches credentials and recovers from 401s
//! - `router`: the route table and the navigation guard
//! - `config`: environment-driven configuration
//!
//! One `CredentialStore` is built at startup and shared by handle with the
//! `ApiClient` and the `Router`; the two consumers never talk to each other.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod router;
pub mod utils;

pub use api::{ApiClient, ApiError, ApiRequest, SessionExpiredHandler};
pub use auth::{CredentialKey, CredentialStore, SessionManager, SessionState, StoreError};
pub use config::{Config, ConfigError, StorageMode};
pub use router::{Navigation, Route, RouteError, RouteGuard, RouteMeta, RouteTable, Router};
