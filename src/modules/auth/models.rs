use serde::{Deserialize, Serialize};

/// Body of `POST /register` and `POST /login`.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Field-level problems, empty when the credentials are usable.
    pub fn problems(&self) -> Vec<serde_json::Value> {
        let mut problems = Vec::new();
        if self.username.trim().is_empty() {
            problems.push(serde_json::json!({"field": "username", "error": "required"}));
        }
        if self.password.is_empty() {
            problems.push(serde_json::json!({"field": "password", "error": "required"}));
        }
        problems
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub msg: String,
}

impl Message {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "Bearer",
        }
    }
}
