//! # Faucet HTTP Client
//!
//! `POST <endpoint>` with body `{"address": "<account>"}`.
//!
//! Any 2xx status is a grant. On failure the faucet is expected to answer
//! with a JSON object carrying a `message` field, which becomes the error
//! text.

use super::error::{FaucetError, FaucetResult, UNKNOWN_ERROR_MESSAGE};
use super::traits::{FaucetApi, FaucetGrant};
use crate::domain::value_objects::format_address;
use async_trait::async_trait;
use ethers::types::Address;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct FaucetRequestBody {
    address: String,
}

#[derive(Debug, Default, Deserialize)]
struct FaucetResponseBody {
    #[serde(default)]
    message: Option<String>,
}

/// HTTP faucet client.
#[derive(Debug, Clone)]
pub struct HttpFaucetClient {
    /// Inner reqwest client.
    client: Client,
    /// Faucet endpoint URL.
    endpoint: String,
    /// Request timeout in milliseconds.
    timeout_ms: u64,
}

impl HttpFaucetClient {
    /// Creates a new faucet client.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Faucet URL
    /// * `timeout_ms` - Request timeout in milliseconds
    ///
    /// # Errors
    ///
    /// Returns `FaucetError::Internal` if the client cannot be created.
    pub fn new(endpoint: impl Into<String>, timeout_ms: u64) -> FaucetResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| FaucetError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout_ms,
        })
    }

    /// Returns the configured timeout in milliseconds.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    async fn handle_response(&self, response: Response) -> FaucetResult<FaucetGrant> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            let message = serde_json::from_str::<FaucetResponseBody>(&body)
                .ok()
                .and_then(|b| b.message);
            debug!(status = status.as_u16(), ?message, "faucet accepted request");
            return Ok(FaucetGrant {
                status: status.as_u16(),
                message,
            });
        }

        let message = match serde_json::from_str::<FaucetResponseBody>(&body) {
            Ok(parsed) => parsed
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string()),
            Err(_) if body.trim().is_empty() => UNKNOWN_ERROR_MESSAGE.to_string(),
            Err(_) => body.trim().to_string(),
        };

        warn!(status = status.as_u16(), %message, "faucet error response");
        Err(FaucetError::rejected(status.as_u16(), message))
    }

    fn map_reqwest_error(&self, error: reqwest::Error) -> FaucetError {
        if error.is_timeout() {
            FaucetError::timeout(format!("Request timed out after {}ms", self.timeout_ms))
        } else if error.is_connect() {
            FaucetError::connection(format!("Connection failed: {}", error))
        } else {
            FaucetError::connection(format!("HTTP request failed: {}", error))
        }
    }
}

#[async_trait]
impl FaucetApi for HttpFaucetClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request_funds(&self, address: Address) -> FaucetResult<FaucetGrant> {
        let body = FaucetRequestBody {
            address: format_address(&address),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        self.handle_response(response).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn account() -> Address {
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".parse().unwrap()
    }

    fn client_for(server: &MockServer) -> HttpFaucetClient {
        HttpFaucetClient::new(format!("{}/faucet", server.uri()), 2_000).unwrap()
    }

    #[test]
    fn new_client() {
        let client = HttpFaucetClient::new("http://localhost/faucet", 5000).unwrap();
        assert_eq!(client.timeout_ms(), 5000);
        assert_eq!(client.endpoint(), "http://localhost/faucet");
    }

    #[tokio::test]
    async fn posts_json_address() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/faucet"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "address": "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "sent"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let grant = client_for(&server).request_funds(account()).await.unwrap();
        assert_eq!(grant.status, 200);
        assert_eq!(grant.message.as_deref(), Some("sent"));
    }

    #[tokio::test]
    async fn success_without_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let grant = client_for(&server).request_funds(account()).await.unwrap();
        assert_eq!(grant.status, 204);
        assert!(grant.message.is_none());
    }

    #[tokio::test]
    async fn error_message_from_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_json(serde_json::json!({"message": "Try again in 5 minutes"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .request_funds(account())
            .await
            .unwrap_err();
        assert_eq!(err, FaucetError::rejected(429, "Try again in 5 minutes"));
    }

    #[tokio::test]
    async fn error_without_message_is_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .request_funds(account())
            .await
            .unwrap_err();
        assert_eq!(err, FaucetError::rejected(500, UNKNOWN_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn connection_refused() {
        let client = HttpFaucetClient::new("http://127.0.0.1:1/faucet", 1_000).unwrap();
        let err = client.request_funds(account()).await.unwrap_err();
        assert!(matches!(
            err,
            FaucetError::Connection { .. } | FaucetError::Timeout { .. }
        ));
    }
}
