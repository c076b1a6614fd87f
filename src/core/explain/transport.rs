use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error};

use super::types::ChatCompletionRequest;
use crate::shared::error::{AppError, AppResult};

/// Carries one completion request to the endpoint and returns the raw body
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn send(
        &self,
        endpoint: &str,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> AppResult<String>;
}

/// HTTPS transport backed by a pooled reqwest client.
///
/// The client built by `new` has no overall timeout; the bound belongs to
/// `ExplanationClient::with_timeout`.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent("explain-popover/0.1")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn send(
        &self,
        endpoint: &str,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> AppResult<String> {
        let started = Instant::now();
        let response = self
            .client
            .post(endpoint)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    return AppError::Timeout(started.elapsed().as_millis() as u64);
                }
                error!(error = %e, "completion endpoint unreachable");
                AppError::Network(format!("Completion endpoint connection failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Network(format!(
                "Completion endpoint returned error: {}",
                status
            )));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(started.elapsed().as_millis() as u64)
            } else {
                AppError::from(e)
            }
        })?;
        debug!(bytes = body.len(), "completion body received");
        Ok(body)
    }
}
