//! Bot control API client
//!
//! Implements the backend API for:
//! - Bot status, start/stop
//! - Broker OTP login
//! - Settings read/write and connection test
//!
//! Failure contract: every call yields `Option`. Transport and decode errors
//! become `None` ("no update this cycle"); a 401 logs the dashboard out and
//! also yields `None`. Any other status code hands back the parsed body.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::lifecycle::{Lifecycle, LogoutReason};
use crate::transport::{ApiRequest, HttpMethod, HttpTransport};
use crate::types::{ActionResponse, BotStatus, OtpRequest, Settings, SettingsSaveResponse};

pub const STATUS_PATH: &str = "/api/bot/status";
pub const START_PATH: &str = "/api/bot/start";
pub const STOP_PATH: &str = "/api/bot/stop";
pub const INITIATE_LOGIN_PATH: &str = "/api/bot/initiate-login";
pub const OTP_PATH: &str = "/api/bot/otp";
pub const SETTINGS_PATH: &str = "/api/settings/";
pub const TEST_CONNECTION_PATH: &str = "/api/settings/test-connection";

/// Backend API client
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    lifecycle: Arc<Lifecycle>,
}

impl ApiClient {
    /// Create new client over a transport
    pub fn new(transport: Arc<dyn HttpTransport>, lifecycle: Arc<Lifecycle>) -> Self {
        Self {
            transport,
            lifecycle,
        }
    }

    pub fn lifecycle(&self) -> &Arc<Lifecycle> {
        &self.lifecycle
    }

    /// Perform one request and return its JSON body
    pub async fn call(&self, path: &str, method: HttpMethod, body: Option<Value>) -> Option<Value> {
        if !self.lifecycle.is_active() {
            tracing::debug!(%method, path, "skipping request after logout");
            return None;
        }

        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(session) = self.lifecycle.session() {
            headers.push(("Authorization".to_string(), format!("Bearer {}", session.token)));
        }

        let request = ApiRequest {
            method,
            path: path.to_string(),
            headers,
            body,
        };

        tracing::debug!(%method, path, "api request");
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(%method, path, "API error: {e}");
                return None;
            }
        };

        if response.status == 401 {
            tracing::warn!(%method, path, "session rejected by backend");
            self.lifecycle.logout(LogoutReason::Unauthorized);
            return None;
        }

        match serde_json::from_str::<Value>(&response.body) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%method, path, status = response.status, "non-JSON response: {e}");
                None
            }
        }
    }

    /// `call` plus decoding into a typed body; a shape mismatch is a parse failure
    async fn call_as<T: DeserializeOwned>(
        &self,
        path: &str,
        method: HttpMethod,
        body: Option<Value>,
    ) -> Option<T> {
        let value = self.call(path, method, body).await?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                tracing::warn!(%method, path, "unexpected response shape: {e}");
                None
            }
        }
    }

    /// Get bot status snapshot
    pub async fn status(&self) -> Option<BotStatus> {
        self.call_as(STATUS_PATH, HttpMethod::Get, None).await
    }

    pub async fn start_bot(&self) -> Option<ActionResponse> {
        self.call_as(START_PATH, HttpMethod::Post, None).await
    }

    pub async fn stop_bot(&self) -> Option<ActionResponse> {
        self.call_as(STOP_PATH, HttpMethod::Post, None).await
    }

    /// Ask the broker to send an OTP
    pub async fn initiate_login(&self) -> Option<ActionResponse> {
        self.call_as(INITIATE_LOGIN_PATH, HttpMethod::Post, None).await
    }

    pub async fn submit_otp(&self, otp: &str) -> Option<ActionResponse> {
        let body = serde_json::to_value(OtpRequest {
            otp: otp.to_string(),
        })
        .ok()?;
        self.call_as(OTP_PATH, HttpMethod::Post, Some(body)).await
    }

    /// Get settings snapshot
    pub async fn settings(&self) -> Option<Settings> {
        self.call_as(SETTINGS_PATH, HttpMethod::Get, None).await
    }

    pub async fn save_settings(&self, payload: Map<String, Value>) -> Option<SettingsSaveResponse> {
        self.call_as(SETTINGS_PATH, HttpMethod::Post, Some(Value::Object(payload)))
            .await
    }

    pub async fn test_connection(&self) -> Option<ActionResponse> {
        self.call_as(TEST_CONNECTION_PATH, HttpMethod::Post, None).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{DashboardError, Result};
    use crate::lifecycle::tests::RecordingFrontend;
    use crate::session::{MemorySessionStore, Session, SessionStore};
    use crate::transport::ApiResponse;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    enum Scripted {
        Reply(u16, String),
        Fail,
    }

    /// Transport double: per-route response queues, the last one sticks
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        routes: Mutex<HashMap<(HttpMethod, String), VecDeque<Scripted>>>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl ScriptedTransport {
        fn push(&self, method: HttpMethod, path: &str, scripted: Scripted) {
            self.routes
                .lock()
                .unwrap()
                .entry((method, path.to_string()))
                .or_default()
                .push_back(scripted);
        }

        pub fn reply(&self, method: HttpMethod, path: &str, status: u16, body: Value) {
            self.push(method, path, Scripted::Reply(status, body.to_string()));
        }

        pub fn reply_raw(&self, method: HttpMethod, path: &str, status: u16, body: &str) {
            self.push(method, path, Scripted::Reply(status, body.to_string()));
        }

        pub fn fail(&self, method: HttpMethod, path: &str) {
            self.push(method, path, Scripted::Fail);
        }

        pub fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn count(&self, method: HttpMethod, path: &str) -> usize {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.method == method && r.path == path)
                .count()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
            let key = (request.method, request.path.clone());
            self.requests.lock().unwrap().push(request);
            let scripted = {
                let mut routes = self.routes.lock().unwrap();
                match routes.get_mut(&key) {
                    Some(queue) if queue.len() > 1 => queue.pop_front(),
                    Some(queue) => queue.front().cloned(),
                    None => None,
                }
            };
            match scripted {
                Some(Scripted::Reply(status, body)) => Ok(ApiResponse { status, body }),
                Some(Scripted::Fail) => Err(DashboardError::Http("connection refused".into())),
                None => Err(DashboardError::Http(format!("unscripted route {key:?}"))),
            }
        }
    }

    pub(crate) struct Harness {
        pub transport: Arc<ScriptedTransport>,
        pub store: Arc<MemorySessionStore>,
        pub frontend: Arc<RecordingFrontend>,
        pub client: ApiClient,
    }

    pub(crate) fn harness() -> Harness {
        let transport = Arc::new(ScriptedTransport::default());
        let store = Arc::new(MemorySessionStore::new(Some(Session::new("tok-abc", "asha"))));
        let frontend = Arc::new(RecordingFrontend::default());
        let lifecycle = Arc::new(Lifecycle::new(store.clone(), frontend.clone()));
        let client = ApiClient::new(transport.clone(), lifecycle);
        Harness {
            transport,
            store,
            frontend,
            client,
        }
    }

    #[tokio::test]
    async fn test_headers_attached() {
        let h = harness();
        h.transport
            .reply(HttpMethod::Get, STATUS_PATH, 200, json!({"running": false}));
        let status = h.client.status().await;
        assert_eq!(status.map(|s| s.running), Some(false));

        let request = &h.transport.requests()[0];
        assert_eq!(request.header("Authorization"), Some("Bearer tok-abc"));
        assert_eq!(request.header("Content-Type"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_transport_and_parse_failures_are_none() {
        let h = harness();
        h.transport.fail(HttpMethod::Get, STATUS_PATH);
        assert!(h.client.call(STATUS_PATH, HttpMethod::Get, None).await.is_none());

        h.transport
            .reply_raw(HttpMethod::Post, STOP_PATH, 502, "<html>Bad Gateway</html>");
        assert!(h.client.stop_bot().await.is_none());
        assert!(h.client.lifecycle().is_active());
    }

    #[tokio::test]
    async fn test_non_2xx_body_returned() {
        let h = harness();
        h.transport.reply(
            HttpMethod::Post,
            START_PATH,
            400,
            json!({"detail": "mStock credentials not configured. Go to Settings."}),
        );
        let reply = h.client.start_bot().await.unwrap();
        assert!(reply.is_error());
    }

    #[tokio::test]
    async fn test_unauthorized_logs_out_once() {
        let h = harness();
        h.transport
            .reply(HttpMethod::Get, SETTINGS_PATH, 401, json!({"detail": "Invalid token"}));

        assert!(h.client.settings().await.is_none());
        assert!(h.client.settings().await.is_none());

        assert!(h.store.get().is_none());
        assert_eq!(h.frontend.redirects(), 1);
        // Stopped client no longer reaches the network
        assert_eq!(h.transport.count(HttpMethod::Get, SETTINGS_PATH), 1);
    }

    #[tokio::test]
    async fn test_otp_body() {
        let h = harness();
        h.transport
            .reply(HttpMethod::Post, OTP_PATH, 200, json!({"status": "authenticated"}));
        h.client.submit_otp("123456").await;
        assert_eq!(h.transport.requests()[0].body, Some(json!({"otp": "123456"})));
    }
}
