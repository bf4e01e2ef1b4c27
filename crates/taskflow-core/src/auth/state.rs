//! Client-side authentication state machine.
//!
//! Tracks whether a user is signed in and drives the login, signup, and
//! logout flows against the [`ApiClient`]. Failures during login/signup are
//! propagated so forms can show them inline; failures during the startup
//! probe and logout are logged and swallowed - both have an unambiguous
//! fallback state.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, User};
use crate::notify::{Navigator, Route};
use crate::retry::retry_with_backoff;

/// Session-fetch attempts after signup before giving up on the backend.
const SESSION_RETRY_ATTEMPTS: u32 = 3;

/// Initial backoff between signup session-fetch attempts.
const SESSION_RETRY_BACKOFF_MS: u64 = 300;

/// Pause between entering `Authenticated` and navigating, so observers of
/// the status see the new state before the redirect lands.
const STATE_SETTLE_MS: u64 = 100;

/// Authentication status as known by this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    /// A flow or the startup probe is in flight.
    Loading,
    Authenticated(User),
    Unauthenticated,
}

/// Holder for the process-wide authentication state.
pub struct AuthState {
    api: ApiClient,
    navigator: Arc<dyn Navigator>,
    status: AuthStatus,
}

impl AuthState {
    /// Starts in `Loading`; call [`initialize`](Self::initialize) to settle
    /// the real state.
    pub fn new(api: ApiClient, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            api,
            navigator,
            status: AuthStatus::Loading,
        }
    }

    pub fn status(&self) -> &AuthStatus {
        &self.status
    }

    pub fn user(&self) -> Option<&User> {
        match &self.status {
            AuthStatus::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.status, AuthStatus::Authenticated(_))
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Silent startup probe: validate any stored token and load the profile.
    /// Never emits notifications and never fails - an error just lands in
    /// `Unauthenticated`.
    pub async fn initialize(&mut self) {
        self.status = AuthStatus::Loading;

        if self.api.is_authenticated().await {
            match self.api.get_session(false, false).await {
                Ok(session) => {
                    self.status = AuthStatus::Authenticated(session.user);
                    return;
                }
                Err(err) => {
                    debug!(error = %err, "session fetch failed during startup probe");
                }
            }
        }

        self.status = AuthStatus::Unauthenticated;
    }

    /// Sign in. On success the token is persisted, the profile is loaded,
    /// and the host is steered to the task surface. The error is returned
    /// for inline display; its `Display` is the most specific message the
    /// server offered.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ApiError> {
        self.status = AuthStatus::Loading;

        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let result = match self.api.login(&request).await {
            Ok(_) => self.api.get_session(true, true).await.map(|s| s.user),
            Err(err) => Err(err),
        };

        match result {
            Ok(user) => {
                self.status = AuthStatus::Authenticated(user);
                self.settle().await;
                self.navigator.go(Route::Tasks);
                Ok(())
            }
            Err(err) => {
                // Whatever the server handed out is suspect now.
                if let Err(clear_err) = self.api.tokens().clear().await {
                    warn!(error = %clear_err, "failed to clear token after login failure");
                }
                self.status = AuthStatus::Unauthenticated;
                Err(err)
            }
        }
    }

    /// Create an account and sign in. A freshly minted token may not be
    /// queryable yet, so the session fetch is retried with backoff; when the
    /// backend still refuses, a minimal user is synthesized from the signup
    /// response and the flow completes anyway.
    pub async fn signup(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        self.status = AuthStatus::Loading;

        let request = RegisterRequest {
            email: email.to_string(),
            name: name.to_string(),
            password: password.to_string(),
        };

        let response = match self.api.register(&request).await {
            Ok(response) => response,
            Err(err) => {
                if let Err(clear_err) = self.api.tokens().clear().await {
                    warn!(error = %clear_err, "failed to clear token after signup failure");
                }
                self.status = AuthStatus::Unauthenticated;
                return Err(err);
            }
        };

        let api = &self.api;
        let session_user = retry_with_backoff(
            SESSION_RETRY_ATTEMPTS,
            Duration::from_millis(SESSION_RETRY_BACKOFF_MS),
            move || async move { api.get_session(false, false).await.map(|s| s.user) },
        )
        .await;

        let user = match session_user {
            Ok(user) => user,
            Err(err) => {
                debug!(error = %err, "session not ready after signup; using signup response");
                synthesize_user(&response, name, email)
            }
        };

        self.status = AuthStatus::Authenticated(user);
        self.settle().await;
        self.navigator.go(Route::Tasks);
        Ok(())
    }

    /// Sign out. Never fails observably: local state is cleared regardless
    /// of what the backend said, and the host lands on the public surface.
    pub async fn logout(&mut self) {
        self.status = AuthStatus::Loading;
        self.api.logout().await;
        self.status = AuthStatus::Unauthenticated;
        self.navigator.go(Route::Landing);
    }

    async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(STATE_SETTLE_MS)).await;
    }
}

/// Minimal user record when the session is not yet queryable: identifier
/// from the signup response if it carried one, name and email from the
/// form inputs.
fn synthesize_user(response: &AuthResponse, name: &str, email: &str) -> User {
    User {
        id: response
            .user
            .as_ref()
            .map(|u| u.id.clone())
            .unwrap_or_default(),
        email: email.to_string(),
        name: name.to_string(),
        bio: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesize_user_takes_id_from_response() {
        let response = AuthResponse {
            access_token: Some("tok".to_string()),
            token_type: None,
            user: Some(User {
                id: "abc".to_string(),
                email: "server@b.com".to_string(),
                name: "Server Name".to_string(),
                bio: None,
            }),
        };

        let user = synthesize_user(&response, "Ada", "ada@b.com");
        assert_eq!(user.id, "abc");
        // Form inputs win over whatever the server echoed.
        assert_eq!(user.email, "ada@b.com");
        assert_eq!(user.name, "Ada");
    }

    #[test]
    fn test_synthesize_user_empty_id_without_response_user() {
        let user = synthesize_user(&AuthResponse::default(), "Ada", "ada@b.com");
        assert_eq!(user.id, "");
        assert_eq!(user.email, "ada@b.com");
    }
}
