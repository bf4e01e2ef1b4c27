use serde::Deserialize;
use thiserror::Error;

/// Errors surfaced by [`ApiClient`](super::ApiClient) operations.
///
/// The `Display` text of each variant is the user-facing message; callers
/// that need to show an inline error (login/signup forms) render it
/// directly instead of probing response bodies themselves.
#[derive(Error, Debug)]
pub enum ApiError {
    /// 401 - the stored token was rejected and has been cleared.
    #[error("Session expired. Please log in again.")]
    Unauthorized,

    /// 403 - authenticated but not allowed.
    #[error("Access denied: Insufficient permissions.")]
    Forbidden,

    /// Any other non-2xx status, carrying the server-supplied message.
    #[error("{message}")]
    Request { status: u16, message: String },

    /// The request never produced an HTTP response.
    #[error("{0}")]
    Network(#[from] NetworkError),

    /// A session fetch was attempted without stored credentials.
    #[error("No token found")]
    MissingToken,
}

/// Transport-level failure classification.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkError {
    #[error("You are offline. Please check your internet connection.")]
    Offline,

    #[error("Request timed out. Please try again.")]
    TimedOut,

    #[error("Network error. Please check your internet connection and try again.")]
    Unreachable,

    #[error("An unexpected error occurred. Please try again.")]
    Unexpected,
}

impl NetworkError {
    /// Classify a request that failed before an HTTP status arrived.
    pub fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkError::TimedOut
        } else if err.is_connect() {
            NetworkError::Unreachable
        } else {
            NetworkError::Unexpected
        }
    }
}

impl ApiError {
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            code => ApiError::Request {
                status: code,
                message: server_message(body, &format!("HTTP error! status: {}", code)),
            },
        }
    }

    /// HTTP status carried by the error, if it reached the server.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Forbidden => Some(403),
            ApiError::Request { status, .. } => Some(*status),
            ApiError::Network(_) | ApiError::MissingToken => None,
        }
    }
}

/// Error body convention: `{detail?, message?}`, anything unparseable
/// collapses to the fallback.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub(crate) fn server_message(body: &str, fallback: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .detail
        .or(parsed.message)
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_server_message_prefers_detail() {
        let body = r#"{"detail": "Email already registered", "message": "nope"}"#;
        assert_eq!(server_message(body, "fallback"), "Email already registered");
    }

    #[test]
    fn test_server_message_falls_back_to_message() {
        let body = r#"{"message": "bad request"}"#;
        assert_eq!(server_message(body, "fallback"), "bad request");
    }

    #[test]
    fn test_server_message_unparseable_body() {
        assert_eq!(server_message("<html>502</html>", "fallback"), "fallback");
        assert_eq!(server_message("", "fallback"), "fallback");
    }

    #[test]
    fn test_from_status_classification() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, ""),
            ApiError::Forbidden
        ));

        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "{}");
        match err {
            ApiError::Request { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "HTTP error! status: 500");
            }
            other => panic!("expected Request error, got {:?}", other),
        }
    }

    #[test]
    fn test_display_is_the_user_message() {
        let err = ApiError::Request {
            status: 400,
            message: "Incorrect email or password".to_string(),
        };
        assert_eq!(err.to_string(), "Incorrect email or password");
        assert_eq!(
            ApiError::Network(NetworkError::TimedOut).to_string(),
            "Request timed out. Please try again."
        );
    }
}
