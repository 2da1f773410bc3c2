//! Typed endpoints of the JuanCharge backend.
//!
//! Thin wrappers over `ApiClient`: every call goes through the session
//! interceptor, so it carries the stored token and recovers from a 401 the
//! same way as a raw `ApiClient::send`. Responses may arrive bare or wrapped
//! as `{"data": ...}`; both are accepted.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::{ApiClient, ApiError, ApiRequest};
use crate::models::{
    validate_points_range, Achievement, ChargingSession, KioskStatus, PaymentMethod,
    PaymentResult, ScanResult, SessionStatus, StartChargingRequest, Station, UserStats,
    MAX_POINTS_PER_SESSION, MIN_POINTS,
};

/// Search radius in km when none is given.
pub const DEFAULT_NEARBY_RADIUS_KM: f64 = 5.0;

/// Take `data` out of a `{"data": ...}` envelope; anything else is the payload itself.
fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

async fn fetch<T: DeserializeOwned>(api: &ApiClient, request: ApiRequest) -> Result<T, ApiError> {
    let body: Value = api.send_json(&request).await?;
    serde_json::from_value(unwrap_data(body)).map_err(|e| {
        ApiError::InvalidResponse(format!("Unexpected payload from {}: {}", request.path, e))
    })
}

/// Optional filters for paged listings.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListParams {
    fn apply(&self, mut request: ApiRequest) -> ApiRequest {
        if let Some(page) = self.page {
            request = request.query("page", page);
        }
        if let Some(per_page) = self.per_page {
            request = request.query("per_page", per_page);
        }
        request
    }
}

impl ApiClient {
    pub fn stations(&self) -> StationService<'_> {
        StationService { api: self }
    }

    pub fn charging(&self) -> ChargingService<'_> {
        ChargingService { api: self }
    }

    pub fn user(&self) -> UserService<'_> {
        UserService { api: self }
    }

    pub fn payments(&self) -> PaymentService<'_> {
        PaymentService { api: self }
    }
}

pub struct StationService<'a> {
    api: &'a ApiClient,
}

impl StationService<'_> {
    pub async fn all(
        &self,
        status: Option<KioskStatus>,
        params: &ListParams,
    ) -> Result<Vec<Station>, ApiError> {
        let mut request = params.apply(ApiRequest::get("/stations"));
        if let Some(status) = status {
            request = request.query("status", status.as_str());
        }
        fetch(self.api, request).await
    }

    pub async fn by_id(&self, id: i64) -> Result<Station, ApiError> {
        fetch(self.api, ApiRequest::get(format!("/stations/{}", id))).await
    }

    /// Stations within `radius_km` (default 5 km) of a point.
    pub async fn nearby(
        &self,
        lat: f64,
        lng: f64,
        radius_km: Option<f64>,
    ) -> Result<Vec<Station>, ApiError> {
        let request = ApiRequest::get("/stations/nearby")
            .query("lat", lat)
            .query("lng", lng)
            .query("radius", radius_km.unwrap_or(DEFAULT_NEARBY_RADIUS_KM));
        fetch(self.api, request).await
    }
}

pub struct ChargingService<'a> {
    api: &'a ApiClient,
}

impl ChargingService<'_> {
    /// Start charging. Out-of-range points are rejected before any request.
    pub async fn start(&self, request: &StartChargingRequest) -> Result<ChargingSession, ApiError> {
        if let Some(points) = request.points {
            if !validate_points_range(points) {
                return Err(ApiError::Validation(format!(
                    "points must be between {} and {}, got {}",
                    MIN_POINTS, MAX_POINTS_PER_SESSION, points
                )));
            }
        }
        fetch(self.api, ApiRequest::post("/charging/start").json(request)?).await
    }

    pub async fn stop(&self, session_id: &str) -> Result<ChargingSession, ApiError> {
        let body = SessionRef { session_id };
        fetch(self.api, ApiRequest::post("/charging/stop").json(&body)?).await
    }

    /// The running session, if any.
    pub async fn active(&self) -> Result<Option<ChargingSession>, ApiError> {
        fetch(self.api, ApiRequest::get("/charging/active")).await
    }

    pub async fn history(
        &self,
        status: Option<SessionStatus>,
        params: &ListParams,
    ) -> Result<Vec<ChargingSession>, ApiError> {
        let mut request = params.apply(ApiRequest::get("/charging/history"));
        if let Some(status) = status {
            request = request.query("status", status.as_str());
        }
        fetch(self.api, request).await
    }

    pub async fn scan(&self, qr_code: &str) -> Result<ScanResult, ApiError> {
        let body = ScanRequest { qr_code };
        fetch(self.api, ApiRequest::post("/charging/scan").json(&body)?).await
    }
}

pub struct UserService<'a> {
    api: &'a ApiClient,
}

impl UserService<'_> {
    pub async fn stats(&self) -> Result<UserStats, ApiError> {
        fetch(self.api, ApiRequest::get("/user/stats")).await
    }

    pub async fn achievements(&self) -> Result<Vec<Achievement>, ApiError> {
        fetch(self.api, ApiRequest::get("/user/achievements")).await
    }

    /// Settings are free-form on the backend; the echoed settings are returned.
    pub async fn update_settings<S: Serialize + ?Sized>(&self, settings: &S) -> Result<Value, ApiError> {
        fetch(self.api, ApiRequest::put("/user/settings").json(settings)?).await
    }
}

pub struct PaymentService<'a> {
    api: &'a ApiClient,
}

impl PaymentService<'_> {
    pub async fn methods(&self) -> Result<Vec<PaymentMethod>, ApiError> {
        fetch(self.api, ApiRequest::get("/payment/methods")).await
    }

    pub async fn add_method(&self, method: &PaymentMethod) -> Result<PaymentMethod, ApiError> {
        fetch(self.api, ApiRequest::post("/payment/methods").json(method)?).await
    }

    pub async fn process(&self, session_id: &str) -> Result<PaymentResult, ApiError> {
        let body = SessionRef { session_id };
        fetch(self.api, ApiRequest::post("/payment/process").json(&body)?).await
    }
}

#[derive(Serialize)]
struct SessionRef<'a> {
    session_id: &'a str,
}

#[derive(Serialize)]
struct ScanRequest<'a> {
    qr_code: &'a str,
}
