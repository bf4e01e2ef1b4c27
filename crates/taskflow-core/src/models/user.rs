use serde::{Deserialize, Serialize};

/// Server-reported profile snapshot. Replaced wholesale on every successful
/// session fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Response from `/api/auth/get-session`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionInfo {
    pub user: User,
}

/// Response from the login/register endpoints. Every field is optional:
/// registration may return a bare profile without a token, and the auth
/// flows must cope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

/// Body for `/api/auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body for `/api/auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login_response() {
        let json = r#"{
            "access_token": "eyJ...",
            "token_type": "bearer",
            "user": {"id": "42", "email": "a@b.com", "name": "Ada"}
        }"#;

        let resp: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access_token.as_deref(), Some("eyJ..."));
        let user = resp.user.unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(user.bio, None);
    }

    #[test]
    fn test_parse_register_response_without_token() {
        // Registration can return just the created profile.
        let json = r#"{"id": "42", "email": "a@b.com", "name": "Ada", "created_at": "2025-03-01T00:00:00Z"}"#;

        let resp: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access_token, None);
        assert_eq!(resp.user, None);
    }

    #[test]
    fn test_parse_session_with_extra_fields() {
        let json = r#"{"user": {"id": "1", "email": "a@b.com", "name": "Ada"}, "token": "eyJ..."}"#;

        let session: SessionInfo = serde_json::from_str(json).unwrap();
        assert_eq!(session.user.name, "Ada");
    }
}
