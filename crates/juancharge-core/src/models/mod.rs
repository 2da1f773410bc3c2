//! Data models exchanged with the JuanCharge backend.
//!
//! Authentication payloads and the cached user profile are what the session
//! subsystem reads. Station, charging, user and payment payloads are parsed
//! leniently: every field is optional and unknown enum values map to `Unknown`.

pub mod auth;
pub mod charging;
pub mod payment;
pub mod user;

pub use auth::{AuthResponse, AutoLoginRequest, AutoLoginResponse, LoginRequest, RegisterRequest};
pub use charging::{
    calculate_co2_saved, calculate_energy, validate_points_range, ChargingSession, Energy,
    KioskStatus, ScanResult, SessionStatus, StartChargingRequest, Station, TransactionType,
    MAX_POINTS_PER_SESSION, MIN_POINTS,
};
pub use payment::{PaymentMethod, PaymentResult};
pub use user::{Achievement, User, UserStats};
