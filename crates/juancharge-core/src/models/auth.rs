use serde::{Deserialize, Serialize};

use super::User;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Human-readable label for this installation, shown in the account's device list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
}

/// Body of a successful `/login` or `/register` call.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub device_token: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
    /// Opaque expiry text, stored as sent.
    #[serde(default)]
    pub token_expires_at: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AutoLoginRequest<'a> {
    pub device_token: &'a str,
}

/// Body of `/auto-login`. `success: false` is a rejected recovery.
#[derive(Debug, Clone, Deserialize)]
pub struct AutoLoginResponse {
    pub success: bool,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub token_expires_at: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_true() -> bool {
    true
}
