//! Stations, charging sessions and the points/energy arithmetic the backend uses.
//!
//! One point buys one minute on one 10 W port.

use serde::{Deserialize, Serialize};

/// Fewest points a charging session can be started with.
pub const MIN_POINTS: u32 = 10;

/// Most points a single charging session can spend.
pub const MAX_POINTS_PER_SESSION: u32 = 10_000;

pub const WATTS_PER_PORT: u32 = 10;

/// 10 W for one minute.
pub const WH_PER_MINUTE: f64 = 0.167;

/// kg of CO2 avoided per kWh.
pub const CO2_PER_KWH: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KioskStatus {
    Active,
    Inactive,
    Maintenance,
    #[serde(other)]
    Unknown,
}

impl KioskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            KioskStatus::Active => "active",
            KioskStatus::Inactive => "inactive",
            KioskStatus::Maintenance => "maintenance",
            KioskStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Earned,
    Redeemed,
    Bonus,
    Adjustment,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Station {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: Option<KioskStatus>,
    pub available_ports: Option<u32>,
    pub distance_km: Option<f64>,
}

impl Station {
    pub fn is_available(&self) -> bool {
        self.status == Some(KioskStatus::Active) && self.available_ports.unwrap_or(0) > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargingSession {
    pub session_id: Option<String>,
    pub station_id: Option<i64>,
    pub status: Option<SessionStatus>,
    pub points: Option<u32>,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
}

impl ChargingSession {
    pub fn energy(&self) -> Option<Energy> {
        self.points.map(calculate_energy)
    }
}

/// Result of scanning a kiosk QR code.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScanResult {
    pub station: Option<Station>,
    pub session: Option<ChargingSession>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartChargingRequest {
    pub station_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Energy {
    pub minutes: u32,
    pub wh: f64,
    pub kwh: f64,
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Energy delivered for `points` (one point per minute).
pub fn calculate_energy(points: u32) -> Energy {
    let wh = f64::from(points) * WH_PER_MINUTE;
    Energy {
        minutes: points,
        wh: round_to(wh, 2),
        kwh: round_to(wh / 1000.0, 4),
    }
}

/// kg of CO2 saved for `kwh`, to two decimals.
pub fn calculate_co2_saved(kwh: f64) -> f64 {
    round_to(kwh * CO2_PER_KWH, 2)
}

pub fn validate_points_range(points: u32) -> bool {
    (MIN_POINTS..=MAX_POINTS_PER_SESSION).contains(&points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_energy() {
        let energy = calculate_energy(60);
        assert_eq!(energy.minutes, 60);
        assert_eq!(energy.wh, 10.02);
        assert_eq!(energy.kwh, 0.01);

        let energy = calculate_energy(1000);
        assert_eq!(energy.wh, 167.0);
        assert_eq!(energy.kwh, 0.167);
    }

    #[test]
    fn test_co2_saved() {
        assert_eq!(calculate_co2_saved(2.0), 1.0);
        assert_eq!(calculate_co2_saved(0.167), 0.08);
    }

    #[test]
    fn test_points_range() {
        assert!(!validate_points_range(9));
        assert!(validate_points_range(MIN_POINTS));
        assert!(validate_points_range(MAX_POINTS_PER_SESSION));
        assert!(!validate_points_range(MAX_POINTS_PER_SESSION + 1));
    }

    #[test]
    fn test_unknown_status_does_not_fail_parse() {
        let station: Station =
            serde_json::from_str(r#"{"id": 3, "status": "decommissioned", "available_ports": 2}"#).unwrap();
        assert_eq!(station.status, Some(KioskStatus::Unknown));
        assert!(!station.is_available());

        let station: Station = serde_json::from_str(r#"{"status": "active", "available_ports": 2}"#).unwrap();
        assert!(station.is_available());
    }
}
