use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::upstream::Credentials;
use crate::error::ProxyError;

pub trait FetchToken {
    fn fetch_token(&self) -> impl std::future::Future<Output = Result<String, ProxyError>> + Send;
}

/// Email/password login against the upstream auth endpoint.
#[derive(Debug, Clone)]
pub struct LoginSource {
    client: Client,
    login_url: String,
    credentials: Credentials,
}

impl LoginSource {
    pub fn new(client: Client, login_url: String, credentials: Credentials) -> Self {
        Self {
            client,
            login_url,
            credentials,
        }
    }
}

impl FetchToken for LoginSource {
    async fn fetch_token(&self) -> Result<String, ProxyError> {
        debug!("POST {}", self.login_url);
        let response = self
            .client
            .post(&self.login_url)
            .json(&self.credentials)
            .send()
            .await
            .map_err(|e| ProxyError::Auth(format!("login request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::Auth(format!("login failed with status {status}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProxyError::Auth(format!("invalid login response: {e}")))?;

        body.get("token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| ProxyError::Auth("token not found in login response".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn login_source(server: &MockServer) -> LoginSource {
        LoginSource::new(
            Client::new(),
            server.url("/api/login"),
            Credentials {
                email: "ops@example.com".into(),
                password: "secret".into(),
            },
        )
    }

    #[tokio::test]
    async fn posts_credentials_and_extracts_token() {
        let server = MockServer::start_async().await;
        let login = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/login")
                    .json_body(json!({"email": "ops@example.com", "password": "secret"}));
                then.status(200).json_body(json!({"token": "abc", "user": {"id": 1}}));
            })
            .await;

        let token = login_source(&server).fetch_token().await.unwrap();
        assert_eq!(token, "abc");
        login.assert_async().await;
    }

    #[tokio::test]
    async fn missing_token_field_is_an_auth_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/login");
                then.status(200).json_body(json!({"message": "ok"}));
            })
            .await;

        let err = login_source(&server).fetch_token().await.unwrap_err();
        assert_eq!(err, ProxyError::Auth("token not found in login response".into()));
    }

    #[tokio::test]
    async fn rejected_login_is_an_auth_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/login");
                then.status(422).json_body(json!({"message": "invalid credentials"}));
            })
            .await;

        let err = login_source(&server).fetch_token().await.unwrap_err();
        assert_eq!(err.kind(), "auth");
        assert!(err.to_string().contains("422"), "{err}");
    }
}
