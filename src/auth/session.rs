//! Session verification against the external auth service

use std::collections::HashMap;

use axum::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, error};

use crate::error::{AppError, Result};

use super::Subject;

/// Answers "who does this bearer token belong to", or `None` if nobody
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Option<Subject>>;
}

/// User payload returned by the auth service
#[derive(Debug, Deserialize)]
struct AuthUserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    app_metadata: Option<AppMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct AppMetadata {
    #[serde(default)]
    role: Option<String>,
}

impl From<AuthUserResponse> for Subject {
    fn from(user: AuthUserResponse) -> Self {
        // Application role wins over the auth service's own role label
        let role = user
            .app_metadata
            .and_then(|meta| meta.role)
            .or(user.role);

        Subject {
            user_id: user.id,
            email: user.email,
            role,
        }
    }
}

/// Verifies tokens with `GET {base_url}/auth/v1/user`
pub struct HttpSessionVerifier {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpSessionVerifier {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn user_url(&self) -> String {
        format!("{}/auth/v1/user", self.base_url)
    }
}

#[async_trait]
impl SessionVerifier for HttpSessionVerifier {
    async fn verify(&self, token: &str) -> Result<Option<Subject>> {
        let url = self.user_url();

        let mut request = self.client.get(&url).bearer_auth(token);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key);
        }

        let response = request.send().await.map_err(|e| {
            error!("Failed to reach auth service at {}: {}", url, e);
            AppError::Upstream(format!("request failed: {}", e))
        })?;

        match response.status() {
            status if status.is_success() => {
                let user: AuthUserResponse = response.json().await.map_err(|e| {
                    AppError::Upstream(format!("invalid user payload: {}", e))
                })?;
                debug!("Session verified for user {}", user.id);
                Ok(Some(user.into()))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status => Err(AppError::Upstream(format!(
                "auth service returned {}",
                status
            ))),
        }
    }
}

/// Fixed token table, for local development and tests
#[derive(Debug, Default, Clone)]
pub struct StaticSessionVerifier {
    tokens: HashMap<String, Subject>,
}

impl StaticSessionVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, subject: Subject) -> Self {
        self.tokens.insert(token.into(), subject);
        self
    }
}

#[async_trait]
impl SessionVerifier for StaticSessionVerifier {
    async fn verify(&self, token: &str) -> Result<Option<Subject>> {
        Ok(self.tokens.get(token).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> Subject {
        Subject {
            user_id: "dev".to_string(),
            email: None,
            role: Some("admin".to_string()),
        }
    }

    #[tokio::test]
    async fn test_static_verifier() {
        let verifier = StaticSessionVerifier::new().with_token("dev-token", subject());

        assert_eq!(verifier.verify("dev-token").await.unwrap(), Some(subject()));
        assert_eq!(verifier.verify("other").await.unwrap(), None);
    }

    #[test]
    fn test_user_url_trims_slash() {
        let verifier = HttpSessionVerifier::new("https://auth.example.com/", None);
        assert_eq!(verifier.user_url(), "https://auth.example.com/auth/v1/user");
    }

    #[test]
    fn test_subject_prefers_app_role() {
        let user: AuthUserResponse = serde_json::from_value(serde_json::json!({
            "id": "5b1f",
            "email": "ops@gas.example.com",
            "role": "authenticated",
            "app_metadata": { "role": "admin" }
        }))
        .unwrap();

        let subject = Subject::from(user);
        assert_eq!(subject.user_id, "5b1f");
        assert_eq!(subject.role.as_deref(), Some("admin"));
    }

    #[test]
    fn test_subject_minimal_payload() {
        let user: AuthUserResponse =
            serde_json::from_value(serde_json::json!({ "id": "abc" })).unwrap();

        let subject = Subject::from(user);
        assert_eq!(subject.email, None);
        assert_eq!(subject.role, None);
    }
}
