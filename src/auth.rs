use std::fmt;

use serde::{Deserialize, Serialize};

/// Body of `POST /api/tester/login`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

// Request payloads are logged; keep the password out of them.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Login response. The token is nullable on the wire.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    #[serde(default)]
    pub access_token: Option<String>,
}

impl AuthToken {
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_debug_hides_password() {
        let credentials = Credentials::new("tester@example.com", "hunter2");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("tester@example.com"));
        assert!(!debug.contains("hunter2"));
        assert_eq!(
            serde_json::to_string(&credentials).unwrap(),
            r#"{"email":"tester@example.com","password":"hunter2"}"#
        );
    }

    #[test]
    fn token_nullable() {
        let token: AuthToken = serde_json::from_str(r#"{"accessToken":null}"#).unwrap();
        assert!(token.access_token().is_none());

        let token: AuthToken = serde_json::from_str(r#"{"refreshToken":"r"}"#).unwrap();
        assert!(token.access_token().is_none());

        let token: AuthToken =
            serde_json::from_str(r#"{"accessToken":"abc","tokenType":"Bearer"}"#).unwrap();
        assert_eq!(token.access_token(), Some("abc"));
    }
}
