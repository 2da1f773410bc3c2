//! REST API client module for the JuanCharge backend.
//!
//! `ApiClient` attaches the stored API token to every request as a bearer
//! credential. When a request comes back 401 it exchanges the stored device
//! token for a fresh API token (auto-login) and replays the request once. If
//! that is impossible, the stored session is cleared and the injected
//! `SessionExpiredHandler` is notified.

pub mod client;
pub mod error;
pub mod request;
pub mod services;

pub use client::{ApiClient, SessionExpiredHandler};
pub use error::ApiError;
pub use request::ApiRequest;
pub use services::{
    ChargingService, ListParams, PaymentService, StationService, UserService,
    DEFAULT_NEARBY_RADIUS_KM,
};
