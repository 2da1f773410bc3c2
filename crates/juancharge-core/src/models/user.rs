use serde::{Deserialize, Serialize};

/// Cached snapshot of the signed-in user's profile.
///
/// Advisory only: nothing in the session subsystem authorizes on it. Unknown
/// fields from the backend are ignored and missing ones default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub points: Option<i64>,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("Unknown user")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserStats {
    pub total_points: Option<i64>,
    pub total_sessions: Option<i64>,
    pub total_energy_wh: Option<f64>,
    pub co2_saved_kg: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Achievement {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub unlocked: bool,
    pub unlocked_at: Option<String>,
}
