//! HTTP transport seam.
//!
//! `Transport` is the single boundary between the typed client and the
//! network: it moves a request to the backend and returns whatever
//! status + JSON body came back, leaving status interpretation to the
//! caller. `HttpTransport` is the real reqwest implementation;
//! `MockTransport` is the scripted stand-in used by tests.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::Value;

use super::error::ApiError;
use crate::config;

/// HTTP method subset the backend contract uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One outbound request, fully described.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL, leading slash included.
    pub path: String,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
            bearer: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
            bearer: None,
        }
    }

    pub fn with_bearer(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_string());
        self
    }
}

/// Raw response: transport succeeded, status not yet interpreted.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body; `Value::Null` when the body was empty or not
    /// JSON at all.
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ApiResponse, ApiError>> + Send + 'a>>;

/// Moves requests to the backend. Implementations must not interpret
/// non-success statuses; the client layer owns that mapping (and the
/// refresh-retry decision that depends on it).
pub trait Transport: Send + Sync {
    fn execute(&self, request: ApiRequest) -> TransportFuture<'_>;
}

// ═══════════════════════════════════════════════════════════
// HttpTransport — reqwest against the real backend
// ═══════════════════════════════════════════════════════════

/// reqwest-backed transport.
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Transport against an explicit base URL.
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config::CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config::REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Transport against the configured backend.
    pub fn from_config() -> Self {
        Self::new(&config::api_base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_send_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_connect() {
            ApiError::Connection(self.base_url.clone())
        } else if err.is_timeout() {
            ApiError::Timeout(config::REQUEST_TIMEOUT_SECS)
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: ApiRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            let url = format!("{}{}", self.base_url, request.path);

            let mut builder = match request.method {
                Method::Get => self.client.get(&url),
                Method::Post => self.client.post(&url),
            };
            if let Some(token) = &request.bearer {
                builder = builder.bearer_auth(token);
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await.map_err(|e| self.map_send_error(e))?;
            let status = response.status().as_u16();
            let text = response
                .text()
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?;
            let body = serde_json::from_str(&text).unwrap_or(Value::Null);

            Ok(ApiResponse { status, body })
        })
    }
}

// ═══════════════════════════════════════════════════════════
// MockTransport — scripted responses for tests
// ═══════════════════════════════════════════════════════════

/// Mock transport for testing: replays scripted responses per route
/// and records every request it sees.
///
/// Responses are keyed by (method, path) and consumed in FIFO order;
/// an unscripted route fails the call with a transport error so tests
/// notice immediately.
#[derive(Default)]
pub struct MockTransport {
    responses: std::sync::Mutex<Vec<(Method, String, Result<ApiResponse, ApiError>)>>,
    requests: std::sync::Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a response for the next call to (method, path).
    pub fn respond(self, method: Method, path: &str, status: u16, body: Value) -> Self {
        self.responses.lock().unwrap().push((
            method,
            path.to_string(),
            Ok(ApiResponse { status, body }),
        ));
        self
    }

    /// Script a transport-level failure for the next call to (method, path).
    pub fn fail(self, method: Method, path: &str, error: ApiError) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push((method, path.to_string(), Err(error)));
        self
    }

    /// Every request executed so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests matching (method, path).
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: ApiRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            self.requests.lock().unwrap().push(request.clone());

            let mut responses = self.responses.lock().unwrap();
            let position = responses
                .iter()
                .position(|(m, p, _)| *m == request.method && *p == request.path);
            match position {
                Some(idx) => responses.remove(idx).2,
                None => Err(ApiError::Transport(format!(
                    "No scripted response for {:?} {}",
                    request.method, request.path
                ))),
            }
        })
    }
}
