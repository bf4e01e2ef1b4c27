//! HTTP client for the TaskFlow backend.
//!
//! All data operations funnel through a single request wrapper that injects
//! the bearer token, enforces the request budget, classifies failures, and
//! raises the matching user-facing notification. Auth endpoints bypass the
//! wrapper so a rejected login can never recurse into the 401 handling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use reqwest::{header, Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::TokenStore;
use crate::cache::ResponseCache;
use crate::models::{
    AuthResponse, LoginRequest, RegisterRequest, SessionInfo, Task, TaskCreate, TaskUpdate, User,
};
use crate::notify::{LogNotifier, Navigator, Notifier, NullNavigator, Route};

use super::error::server_message;
use super::{ApiError, NetworkError};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request budget in seconds.
/// 10s fails fast enough that the UI never looks hung.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Round-trip latency above which a request is logged as slow.
const SLOW_REQUEST_MS: u128 = 2000;

const SESSION_FETCH_FAILED: &str = "Failed to retrieve session";

/// API client for the TaskFlow backend.
/// Clone is cheap - the HTTP pool, token slot, and cache are all shared.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: TokenStore,
    cache: ResponseCache,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    offline: Arc<AtomicBool>,
}

impl ApiClient {
    /// Create a client against `base_url` with the default request budget.
    pub fn new(base_url: impl Into<String>, tokens: TokenStore) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            http,
            base_url,
            tokens,
            cache: ResponseCache::new(),
            notifier: Arc::new(LogNotifier),
            navigator: Arc::new(NullNavigator),
            offline: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Replace the notification sink.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replace the redirect sink.
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Override the request budget. Mainly for tests and unusual networks.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// Flag the process as offline/online. While offline, every wrapped
    /// request short-circuits without touching the network.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    // =========================================================================
    // Request wrapper
    // =========================================================================

    /// Perform an authenticated call and classify the outcome.
    /// Returns `None` for 204 responses, the parsed JSON body otherwise.
    async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<Option<Value>, ApiError> {
        if self.offline.load(Ordering::Relaxed) {
            let err = ApiError::Network(NetworkError::Offline);
            self.notifier.error(&err.to_string());
            return Err(err);
        }

        let url = format!("{}{}", self.base_url, endpoint);
        let mut request = self
            .http
            .request(method, &url)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(token) = self.tokens.get().await {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let started = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                let kind = NetworkError::classify(&err);
                warn!(endpoint, error = %err, "request failed without a response");
                self.notifier.error(&kind.to_string());
                return Err(kind.into());
            }
        };

        let elapsed = started.elapsed();
        if elapsed.as_millis() > SLOW_REQUEST_MS {
            warn!(endpoint, elapsed_ms = elapsed.as_millis() as u64, "slow API request");
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::from_status(status, &body);

            if matches!(err, ApiError::Unauthorized) {
                // The token is dead; drop it and force re-auth.
                if let Err(clear_err) = self.tokens.clear().await {
                    warn!(error = %clear_err, "failed to clear rejected token");
                }
                self.notifier.error(&err.to_string());
                self.navigator.go(Route::Login);
                return Err(err);
            }

            self.notifier.error(&err.to_string());
            return Err(err);
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        match response.json::<Value>().await {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(endpoint, error = %err, "failed to parse response body");
                let kind = NetworkError::Unexpected;
                self.notifier.error(&kind.to_string());
                Err(kind.into())
            }
        }
    }

    fn decode<T: DeserializeOwned>(&self, endpoint: &str, value: Value) -> Result<T, ApiError> {
        serde_json::from_value(value).map_err(|err| {
            warn!(endpoint, error = %err, "response did not match the expected shape");
            ApiError::Network(NetworkError::Unexpected)
        })
    }

    // =========================================================================
    // Task operations
    // =========================================================================

    /// Fetch the user's tasks, served from cache while the entry is fresh.
    pub async fn get_tasks(&self, user_id: &str) -> Result<Vec<Task>, ApiError> {
        let endpoint = format!("/api/{}/tasks", user_id);

        if let Some(hit) = self.cache.get(user_id, &endpoint).await {
            debug!(user_id, "serving tasks from cache");
            return self.decode(&endpoint, hit);
        }

        let value = require_body(self.execute(Method::GET, &endpoint, None).await?)?;
        self.cache.insert(user_id, &endpoint, value.clone()).await;
        self.decode(&endpoint, value)
    }

    /// Fetch a single task. Never cached.
    pub async fn get_task(&self, user_id: &str, task_id: i64) -> Result<Task, ApiError> {
        let endpoint = format!("/api/{}/tasks/{}", user_id, task_id);
        let value = require_body(self.execute(Method::GET, &endpoint, None).await?)?;
        self.decode(&endpoint, value)
    }

    pub async fn create_task(&self, user_id: &str, task: &TaskCreate) -> Result<Task, ApiError> {
        let endpoint = format!("/api/{}/tasks", user_id);
        let body = encode_body(task)?;

        let result = match self.execute(Method::POST, &endpoint, Some(body)).await {
            Ok(value) => require_body(value).and_then(|v| self.decode(&endpoint, v)),
            Err(err) => Err(err),
        };

        match result {
            Ok(task) => {
                self.cache.invalidate_user(user_id).await;
                self.notifier.success("Task created successfully");
                Ok(task)
            }
            Err(err) => {
                self.notifier.error("Failed to create task");
                Err(err)
            }
        }
    }

    pub async fn update_task(
        &self,
        user_id: &str,
        task_id: i64,
        update: &TaskUpdate,
    ) -> Result<Task, ApiError> {
        let endpoint = format!("/api/{}/tasks/{}", user_id, task_id);
        let body = encode_body(update)?;

        let result = match self.execute(Method::PUT, &endpoint, Some(body)).await {
            Ok(value) => require_body(value).and_then(|v| self.decode(&endpoint, v)),
            Err(err) => Err(err),
        };

        match result {
            Ok(task) => {
                self.cache.invalidate_user(user_id).await;
                self.notifier.success("Task updated successfully");
                Ok(task)
            }
            Err(err) => {
                self.notifier.error("Failed to update task");
                Err(err)
            }
        }
    }

    pub async fn delete_task(&self, user_id: &str, task_id: i64) -> Result<(), ApiError> {
        let endpoint = format!("/api/{}/tasks/{}", user_id, task_id);

        match self.execute(Method::DELETE, &endpoint, None).await {
            Ok(_) => {
                self.cache.invalidate_user(user_id).await;
                self.notifier.success("Task deleted successfully");
                Ok(())
            }
            Err(err) => {
                self.notifier.error("Failed to delete task");
                Err(err)
            }
        }
    }

    pub async fn toggle_task_completion(
        &self,
        user_id: &str,
        task_id: i64,
    ) -> Result<Task, ApiError> {
        let endpoint = format!("/api/{}/tasks/{}/complete", user_id, task_id);

        let result = match self.execute(Method::PATCH, &endpoint, None).await {
            Ok(value) => require_body(value).and_then(|v| self.decode(&endpoint, v)),
            Err(err) => Err(err),
        };

        match result {
            Ok(task) => {
                self.cache.invalidate_user(user_id).await;
                self.notifier.success("Task updated successfully");
                Ok(task)
            }
            Err(err) => {
                self.notifier.error("Failed to update task");
                Err(err)
            }
        }
    }

    // =========================================================================
    // Auth operations
    // =========================================================================

    /// Register a new account. A returned token is persisted immediately.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.auth_call(
            "/api/auth/register",
            request,
            "Registration failed",
            "Account created successfully",
        )
        .await
    }

    /// Exchange credentials for a token; the token is persisted on success.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.auth_call("/api/auth/login", request, "Login failed", "Login successful")
            .await
    }

    /// Direct call to an auth endpoint, outside the wrapped request path so
    /// auth failures never trigger the 401 redirect machinery.
    async fn auth_call<B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
        failure: &str,
        success: &str,
    ) -> Result<AuthResponse, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = match self.http.post(&url).json(body).send().await {
            Ok(response) => response,
            Err(err) => {
                let kind = NetworkError::classify(&err);
                warn!(endpoint, error = %err, "auth request failed without a response");
                self.notifier.error(&kind.to_string());
                return Err(kind.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = server_message(&body, failure);
            self.notifier.error(&message);
            return Err(ApiError::Request {
                status: status.as_u16(),
                message,
            });
        }

        let auth: AuthResponse = match response.json().await {
            Ok(auth) => auth,
            Err(err) => {
                warn!(endpoint, error = %err, "failed to parse auth response");
                let kind = NetworkError::Unexpected;
                self.notifier.error(&kind.to_string());
                return Err(kind.into());
            }
        };

        if let Some(ref token) = auth.access_token {
            if let Err(err) = self.tokens.set(token).await {
                warn!(error = %err, "failed to persist token");
            }
        }

        self.notifier.success(success);
        Ok(auth)
    }

    /// Fetch the current user's profile. Requires a stored token and fails
    /// fast without one. Notification emission is gated so background
    /// probes stay silent.
    pub async fn get_session(
        &self,
        show_success: bool,
        show_error: bool,
    ) -> Result<SessionInfo, ApiError> {
        let Some(token) = self.tokens.get().await else {
            if show_error {
                self.notifier.error(SESSION_FETCH_FAILED);
            }
            return Err(ApiError::MissingToken);
        };

        let url = format!("{}/api/auth/get-session", self.base_url);
        let response = match self.http.get(&url).bearer_auth(&token).send().await {
            Ok(response) => response,
            Err(err) => {
                let kind = NetworkError::classify(&err);
                warn!(error = %err, "session fetch failed without a response");
                if show_error {
                    self.notifier.error(&kind.to_string());
                }
                return Err(kind.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = server_message(&body, SESSION_FETCH_FAILED);
            if show_error {
                self.notifier.error(&message);
            }
            return Err(ApiError::Request {
                status: status.as_u16(),
                message,
            });
        }

        let session: SessionInfo = match response.json().await {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "failed to parse session response");
                let kind = NetworkError::Unexpected;
                if show_error {
                    self.notifier.error(&kind.to_string());
                }
                return Err(kind.into());
            }
        };

        if show_success {
            self.notifier.success("Session retrieved successfully");
        }
        Ok(session)
    }

    /// Sign out. The backend call is best-effort; local state is always
    /// cleared and the operation always reports success.
    pub async fn logout(&self) {
        let url = format!("{}/api/auth/sign-out", self.base_url);
        match self.http.post(&url).send().await {
            Ok(response) => {
                debug!(status = %response.status(), "sign-out response");
            }
            Err(err) => {
                debug!(error = %err, "sign-out request failed; clearing local state anyway");
            }
        }

        if let Err(err) = self.tokens.clear().await {
            warn!(error = %err, "failed to clear stored token");
        }
        self.cache.clear().await;
        self.notifier.success("Logged out successfully");
    }

    /// Live-validation check: false without a token, otherwise the result
    /// of a silent session fetch. A token that fails validation is removed.
    pub async fn is_authenticated(&self) -> bool {
        if !self.tokens.is_present().await {
            return false;
        }

        match self.get_session(false, false).await {
            Ok(_) => true,
            Err(err) => {
                debug!(error = %err, "stored token failed validation");
                if let Err(clear_err) = self.tokens.clear().await {
                    warn!(error = %clear_err, "failed to clear invalid token");
                }
                false
            }
        }
    }

    /// Presence-only check. Says nothing about validity.
    pub async fn has_token(&self) -> bool {
        self.tokens.is_present().await
    }

    /// Convenience for hosts that display the signed-in user.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        Ok(self.get_session(false, true).await?.user)
    }
}

fn require_body(value: Option<Value>) -> Result<Value, ApiError> {
    value.ok_or(ApiError::Network(NetworkError::Unexpected))
}

fn encode_body<B: Serialize>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|err| {
        warn!(error = %err, "failed to encode request body");
        ApiError::Network(NetworkError::Unexpected)
    })
}
