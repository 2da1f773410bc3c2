//! API client for the JuanCharge REST backend.
//!
//! Every call goes through `ApiClient::send`, which reads the API token from
//! the credential store, attaches it as a bearer credential and handles the
//! 401 recovery described in the module docs of `crate::api`.

use std::sync::Arc;

use reqwest::{header, Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{ApiError, ApiRequest};
use crate::auth::CredentialStore;
use crate::config::Config;
use crate::models::{AutoLoginRequest, AutoLoginResponse};

/// Path of the device-token exchange endpoint
pub const AUTO_LOGIN_PATH: &str = "/auto-login";

/// Notified when the session could not be recovered and has been cleared.
///
/// The host application wires this to its own navigation, typically a
/// full-application redirect to the unauthenticated entry point. It may be
/// invoked from outside any navigation in progress.
pub trait SessionExpiredHandler: Send + Sync {
    fn session_expired(&self);
}

impl<F> SessionExpiredHandler for F
where
    F: Fn() + Send + Sync,
{
    fn session_expired(&self) {
        self()
    }
}

/// API client for the JuanCharge backend.
/// Clone is cheap - the reqwest pool, store and handler are all shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    store: CredentialStore,
    on_session_expired: Option<Arc<dyn SessionExpiredHandler>>,
    /// Present when concurrent recoveries share one auto-login.
    recovery_lock: Option<Arc<Mutex<()>>>,
}

impl ApiClient {
    pub fn new(config: &Config, store: CredentialStore) -> Result<Self, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            store,
            on_session_expired: None,
            recovery_lock: config
                .single_flight_recovery
                .then(|| Arc::new(Mutex::new(()))),
        })
    }

    pub fn with_session_expired_handler(
        mut self,
        handler: impl SessionExpiredHandler + 'static,
    ) -> Self {
        self.on_session_expired = Some(Arc::new(handler));
        self
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> Result<Response, ApiError> {
        let mut builder = self
            .client
            .request(request.method.clone(), self.url(&request.path));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        debug!(
            method = %request.method,
            path = %request.path,
            authenticated = token.is_some(),
            "Dispatching request"
        );
        Ok(builder.send().await?)
    }

    /// Send a request with the stored credentials, recovering once from a 401.
    ///
    /// Non-401 responses and transport errors are returned unchanged. On a
    /// 401 the device token is exchanged for a new API token and the request
    /// is replayed exactly once; the replay's outcome is what the caller sees.
    /// If recovery is impossible the session is cleared, the expiry handler
    /// fires and `ApiError::Unauthorized` is returned.
    pub async fn send(&self, request: &ApiRequest) -> Result<Response, ApiError> {
        let token = self.store.api_token().await?;
        let response = self.dispatch(request, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::check_response(response).await;
        }

        warn!(path = %request.path, "401 Unauthorized - attempting auto-login");
        match self.recover(token.as_deref()).await {
            Ok(fresh) => {
                let replay = self.dispatch(request, Some(&fresh)).await?;
                if replay.status() == StatusCode::UNAUTHORIZED {
                    warn!(path = %request.path, "Request still unauthorized after auto-login");
                }
                Self::check_response(replay).await
            }
            // A local storage fault is not an authentication failure
            Err(e @ ApiError::Storage(_)) => {
                warn!(path = %request.path, error = %e, "Credential storage failed during recovery");
                Err(e)
            }
            Err(e) => {
                warn!(path = %request.path, error = %e, "Session recovery failed");
                self.expire_session().await;
                Err(ApiError::Unauthorized)
            }
        }
    }

    /// Obtain a fresh API token for a request that was sent with `stale`.
    async fn recover(&self, stale: Option<&str>) -> Result<String, ApiError> {
        let Some(ref lock) = self.recovery_lock else {
            return self.auto_login().await;
        };

        let _guard = lock.lock().await;
        // Another request may have recovered while this one waited
        if let Some(current) = self.store.api_token().await? {
            if stale != Some(current.as_str()) {
                debug!("Reusing API token from a concurrent recovery");
                return Ok(current);
            }
        }
        self.auto_login().await
    }

    /// Exchange the stored device token for a new API token and persist it.
    pub async fn auto_login(&self) -> Result<String, ApiError> {
        let device_token = self
            .store
            .device_token()
            .await?
            .ok_or(ApiError::NoDeviceToken)?;

        let response = self
            .client
            .post(self.url(AUTO_LOGIN_PATH))
            .json(&AutoLoginRequest {
                device_token: &device_token,
            })
            .send()
            .await?;
        let response = Self::check_response(response).await?;

        let body: AutoLoginResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse auto-login response: {}", e)))?;

        if !body.success {
            return Err(ApiError::Rejected(
                body.message.unwrap_or_else(|| "auto-login refused".to_string()),
            ));
        }

        let api_token = body
            .api_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::InvalidResponse("auto-login response has no api_token".to_string()))?;

        self.store.set_api_token(&api_token).await?;
        if let Some(ref expires_at) = body.token_expires_at {
            self.store.set_token_expires_at_raw(expires_at).await?;
        }

        info!("Auto-login succeeded");
        Ok(api_token)
    }

    /// Clear the stored session and notify the host application.
    async fn expire_session(&self) {
        let report = self.store.clear_all().await;
        if !report.is_clean() {
            warn!(failed = report.failed.len(), "Session cleared with errors");
        }
        match self.on_session_expired {
            Some(ref handler) => handler.session_expired(),
            None => debug!("No session-expired handler installed"),
        }
    }

    // ===== JSON helpers =====

    /// Send without credentials and without 401 recovery.
    ///
    /// For the endpoints that establish a session (login, registration),
    /// where a 401 means bad input rather than an expired token.
    pub async fn send_anonymous(&self, request: &ApiRequest) -> Result<Response, ApiError> {
        let response = self.dispatch(request, None).await?;
        Self::check_response(response).await
    }

    /// Send with an explicit token and without 401 recovery.
    ///
    /// For calls that end the session (logout), where a 401 needs no repair.
    pub async fn send_with_token(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let response = self.dispatch(request, token).await?;
        Self::check_response(response).await
    }

    async fn parse_json<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, ApiError> {
        response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", path, e))
        })
    }

    pub async fn send_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        Self::parse_json(response, &request.path).await
    }

    pub async fn send_anonymous_json<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<T, ApiError> {
        let response = self.send_anonymous(request).await?;
        Self::parse_json(response, &request.path).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json(&ApiRequest::get(path)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(&ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(&ApiRequest::put(path).json(body)?).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json(&ApiRequest::delete(path)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

    use crate::auth::{BackendKind, CredentialKey, MemoryBackend, StorageBackend, StoreError};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicBool;

    struct NoAuthorization;

    impl Match for NoAuthorization {
        fn matches(&self, request: &Request) -> bool {
            !request.headers.contains_key("authorization")
        }
    }

    fn config(server: &MockServer, single_flight: bool) -> Config {
        Config {
            api_base_url: server.uri(),
            single_flight_recovery: single_flight,
            ..Config::default()
        }
    }

    fn client_with_counter(config: &Config, store: &CredentialStore) -> (ApiClient, Arc<AtomicUsize>) {
        let expired = Arc::new(AtomicUsize::new(0));
        let counter = expired.clone();
        let client = ApiClient::new(config, store.clone())
            .unwrap()
            .with_session_expired_handler(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        (client, expired)
    }

    async fn signed_in_store(api_token: &str) -> CredentialStore {
        let store = CredentialStore::in_memory();
        store.set_device_token("dev-1").await.unwrap();
        store.set_api_token(api_token).await.unwrap();
        store.set(CredentialKey::UserData, r#"{"id":1}"#).await.unwrap();
        store
    }

    async fn assert_cleared(store: &CredentialStore) {
        for key in CredentialKey::ALL {
            assert_eq!(store.get(key).await.unwrap(), None, "{} not cleared", key);
        }
    }

    #[tokio::test]
    async fn test_attaches_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/stats"))
            .and(header("authorization", "Bearer api-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"points": 120})))
            .expect(1)
            .mount(&server)
            .await;

        let store = signed_in_store("api-1").await;
        let client = ApiClient::new(&config(&server, false), store).unwrap();
        let stats: Value = client.get("/user/stats").await.unwrap();
        assert_eq!(stats["points"], 120);
    }

    #[tokio::test]
    async fn test_dispatches_anonymously_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stations"))
            .and(NoAuthorization)
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&config(&server, false), CredentialStore::in_memory()).unwrap();
        let stations: Vec<Value> = client.get("/stations").await.unwrap();
        assert!(stations.is_empty());
    }

    #[tokio::test]
    async fn test_recovers_from_stale_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile"))
            .and(header("authorization", "Bearer stale"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auto-login"))
            .and(body_json(json!({"device_token": "dev-1"})))
            .and(NoAuthorization)
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "api_token": "fresh",
                "token_expires_at": "2099-01-01T00:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/profile"))
            .and(header("authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "name": "Juan"})))
            .expect(1)
            .mount(&server)
            .await;

        let store = signed_in_store("stale").await;
        let (client, expired) = client_with_counter(&config(&server, false), &store);

        let profile: Value = client.get("/profile").await.unwrap();

        assert_eq!(profile["name"], "Juan");
        assert_eq!(store.api_token().await.unwrap().as_deref(), Some("fresh"));
        assert_eq!(store.device_token().await.unwrap().as_deref(), Some("dev-1"));
        assert!(store.token_expires_at().await.unwrap().is_some());
        assert_eq!(expired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_replays_request_body_after_recovery() {
        let server = MockServer::start().await;
        let body = json!({"station_id": 9, "ports": 2});
        Mock::given(method("POST"))
            .and(path("/charging/start"))
            .and(header("authorization", "Bearer stale"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auto-login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "api_token": "fresh"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/charging/start"))
            .and(header("authorization", "Bearer fresh"))
            .and(body_json(body.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"session_id": "S1"})))
            .expect(1)
            .mount(&server)
            .await;

        let store = signed_in_store("stale").await;
        let client = ApiClient::new(&config(&server, false), store).unwrap();
        let started: Value = client.post("/charging/start", &body).await.unwrap();
        assert_eq!(started["session_id"], "S1");
    }

    #[tokio::test]
    async fn test_missing_device_token_expires_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(path("/auto-login"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let store = CredentialStore::in_memory();
        store.set_api_token("stale").await.unwrap();
        let (client, expired) = client_with_counter(&config(&server, false), &store);

        let err = client.get::<Value>("/profile").await.unwrap_err();

        assert!(err.is_unauthorized());
        assert_cleared(&store).await;
        assert_eq!(expired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejected_auto_login_expires_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auto-login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false, "message": "device revoked"})))
            .expect(1)
            .mount(&server)
            .await;

        let store = signed_in_store("stale").await;
        let (client, expired) = client_with_counter(&config(&server, false), &store);

        let err = client.get::<Value>("/profile").await.unwrap_err();

        assert!(err.is_unauthorized());
        assert_cleared(&store).await;
        assert_eq!(expired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_auto_login_http_error_expires_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auto-login"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let store = signed_in_store("stale").await;
        let (client, expired) = client_with_counter(&config(&server, false), &store);

        assert!(client.get::<Value>("/profile").await.unwrap_err().is_unauthorized());
        assert_cleared(&store).await;
        assert_eq!(expired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_errors_pass_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stations/404"))
            .respond_with(ResponseTemplate::new(404).set_body_string("station not found"))
            .mount(&server)
            .await;
        Mock::given(path("/auto-login"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let store = signed_in_store("api-1").await;
        let (client, expired) = client_with_counter(&config(&server, false), &store);

        let err = client.get::<Value>("/stations/404").await.unwrap_err();

        assert!(matches!(err, ApiError::NotFound(ref body) if body == "station not found"));
        assert_eq!(store.api_token().await.unwrap().as_deref(), Some("api-1"));
        assert_eq!(expired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_401_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auto-login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "api_token": "fresh"})))
            .expect(1)
            .mount(&server)
            .await;

        let store = signed_in_store("stale").await;
        let (client, expired) = client_with_counter(&config(&server, false), &store);

        assert!(client.get::<Value>("/profile").await.unwrap_err().is_unauthorized());
        assert_eq!(store.api_token().await.unwrap().as_deref(), Some("fresh"));
        assert_eq!(expired.load(Ordering::SeqCst), 0);
    }

    async fn mount_concurrent_scenario(server: &MockServer, auto_logins: u64) {
        Mock::given(method("GET"))
            .and(path("/profile"))
            .and(header("authorization", "Bearer stale"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auto-login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "api_token": "fresh"})))
            .expect(auto_logins)
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/profile"))
            .and(header("authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
            .expect(2)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_concurrent_401s_recover_independently() {
        let server = MockServer::start().await;
        mount_concurrent_scenario(&server, 2).await;

        let store = signed_in_store("stale").await;
        let client = ApiClient::new(&config(&server, false), store).unwrap();

        let (a, b) = tokio::join!(client.get::<Value>("/profile"), client.get::<Value>("/profile"));
        assert_eq!(a.unwrap()["id"], 1);
        assert_eq!(b.unwrap()["id"], 1);
    }

    #[tokio::test]
    async fn test_single_flight_shares_one_auto_login() {
        let server = MockServer::start().await;
        mount_concurrent_scenario(&server, 1).await;

        let store = signed_in_store("stale").await;
        let client = ApiClient::new(&config(&server, true), store).unwrap();

        let (a, b) = tokio::join!(client.get::<Value>("/profile"), client.get::<Value>("/profile"));
        assert_eq!(a.unwrap()["id"], 1);
        assert_eq!(b.unwrap()["id"], 1);
    }

    #[tokio::test]
    async fn test_recovers_when_expiry_is_not_rfc3339() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile"))
            .and(header("authorization", "Bearer stale"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auto-login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "api_token": "fresh",
                "token_expires_at": "2099-01-01 00:00:00"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/profile"))
            .and(header("authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let store = signed_in_store("stale").await;
        let (client, expired) = client_with_counter(&config(&server, false), &store);

        let profile: Value = client.get("/profile").await.unwrap();

        assert_eq!(profile["id"], 1);
        assert_eq!(store.api_token().await.unwrap().as_deref(), Some("fresh"));
        assert_eq!(store.device_token().await.unwrap().as_deref(), Some("dev-1"));
        assert_eq!(
            store.token_expires_at().await.unwrap().as_deref(),
            Some("2099-01-01 00:00:00")
        );
        assert_eq!(expired.load(Ordering::SeqCst), 0);
    }

    /// Memory backend whose writes can be switched to fail.
    #[derive(Default)]
    struct ReadOnlyAfterSetup {
        inner: MemoryBackend,
        fail_sets: AtomicBool,
    }

    #[async_trait]
    impl StorageBackend for ReadOnlyAfterSetup {
        fn kind(&self) -> BackendKind {
            BackendKind::Memory
        }

        async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.fail_sets.load(Ordering::SeqCst) {
                return Err(StoreError::Task("disk full".into()));
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key).await
        }
    }

    #[tokio::test]
    async fn test_storage_fault_during_recovery_keeps_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auto-login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "api_token": "fresh"})))
            .expect(1)
            .mount(&server)
            .await;

        let backend = Arc::new(ReadOnlyAfterSetup::default());
        let store = CredentialStore::new(backend.clone());
        store.set_device_token("dev-1").await.unwrap();
        store.set_api_token("stale").await.unwrap();
        backend.fail_sets.store(true, Ordering::SeqCst);
        let (client, expired) = client_with_counter(&config(&server, false), &store);

        let err = client.get::<Value>("/profile").await.unwrap_err();

        assert!(matches!(err, ApiError::Storage(_)), "unexpected error: {err:?}");
        assert_eq!(store.device_token().await.unwrap().as_deref(), Some("dev-1"));
        assert_eq!(store.api_token().await.unwrap().as_deref(), Some("stale"));
        assert_eq!(expired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_send_with_token_does_not_recover() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/logout"))
            .and(header("authorization", "Bearer api-1"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(path("/auto-login"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let store = signed_in_store("api-1").await;
        let (client, expired) = client_with_counter(&config(&server, false), &store);

        let err = client
            .send_with_token(&ApiRequest::post("/logout"), Some("api-1"))
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(store.api_token().await.unwrap().as_deref(), Some("api-1"));
        assert_eq!(expired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_url_joining() {
        let config = Config {
            api_base_url: "http://localhost:8000/api/".to_string(),
            ..Config::default()
        };
        let client = ApiClient::new(&config, CredentialStore::in_memory()).unwrap();
        assert_eq!(client.url("/login"), "http://localhost:8000/api/login");
        assert_eq!(client.url("stations"), "http://localhost:8000/api/stations");
    }
}
