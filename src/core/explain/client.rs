use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::transport::CompletionTransport;
use super::types::{first_choice_content, ChatCompletionRequest};
use crate::config::{COMPLETION_ENDPOINT, FALLBACK_TEXT, REQUEST_TIMEOUT};
use crate::shared::error::{AppError, AppResult};

/// A successful explanation lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Explanation {
    /// Text taken from the first completion choice
    Completion(String),
    /// Well-formed reply without usable content
    Fallback,
}

impl Explanation {
    /// Text to render and cache
    pub fn text(&self) -> &str {
        match self {
            Explanation::Completion(text) => text,
            Explanation::Fallback => FALLBACK_TEXT,
        }
    }
}

/// Issues explanation requests with the credential supplied at init
#[derive(Clone)]
pub struct ExplanationClient {
    transport: Arc<dyn CompletionTransport>,
    api_key: String,
    endpoint: String,
    timeout: Duration,
}

impl ExplanationClient {
    pub fn new(transport: Arc<dyn CompletionTransport>, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            api_key: api_key.into(),
            endpoint: COMPLETION_ENDPOINT.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// One request, no retry. Transport failures, bodies that are not JSON and
    /// timeouts are errors; a JSON reply without content is `Fallback`.
    pub async fn request(&self, text: &str) -> AppResult<Explanation> {
        let request = ChatCompletionRequest::explain(text);

        let send = self.transport.send(&self.endpoint, &self.api_key, &request);
        let body = match tokio::time::timeout(self.timeout, send).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "explanation request timed out");
                return Err(AppError::Timeout(self.timeout.as_millis() as u64));
            }
        };

        let json: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| AppError::Parse(format!("Failed to parse completion response: {}", e)))?;

        match first_choice_content(&json) {
            Some(content) => {
                debug!(chars = content.chars().count(), "explanation received");
                Ok(Explanation::Completion(content.to_string()))
            }
            None => {
                warn!("completion response had no content, using fallback");
                Ok(Explanation::Fallback)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{completion_body, ScriptedTransport};

    fn client(transport: &Arc<ScriptedTransport>) -> ExplanationClient {
        ExplanationClient::new(transport.clone(), "gsk_test_key")
    }

    #[tokio::test]
    async fn test_request_carries_key_endpoint_and_prompt() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("ownership", Ok(completion_body("Who cleans up memory.")));

        let explanation = client(&transport).request("ownership").await.unwrap();
        assert_eq!(explanation, Explanation::Completion("Who cleans up memory.".into()));

        let calls = transport.captured();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].endpoint, COMPLETION_ENDPOINT);
        assert_eq!(calls[0].api_key, "gsk_test_key");
        assert_eq!(calls[0].request, ChatCompletionRequest::explain("ownership"));
    }

    #[tokio::test]
    async fn test_no_choices_is_fallback_not_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("empty", Ok(r#"{"choices":[]}"#.to_string()));

        let explanation = client(&transport).request("empty").await.unwrap();
        assert_eq!(explanation, Explanation::Fallback);
        assert_eq!(explanation.text(), "No response from AI.");
    }

    #[tokio::test]
    async fn test_unparseable_body_is_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("garbled", Ok("<html>bad gateway</html>".to_string()));

        let err = client(&transport).request("garbled").await.unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[tokio::test]
    async fn test_transport_failure_is_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("offline", Err(AppError::Network("connection refused".into())));

        let err = client(&transport).request("offline").await.unwrap_err();
        assert_eq!(err, AppError::Network("connection refused".into()));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_error() {
        let transport = Arc::new(ScriptedTransport::new());
        // No scripted response: the transport never resolves

        let err = client(&transport)
            .with_timeout(Duration::from_millis(20))
            .request("slow")
            .await
            .unwrap_err();
        assert_eq!(err, AppError::Timeout(20));
    }

    #[tokio::test]
    async fn test_http_request_bounded_by_client_timeout() {
        use crate::core::explain::HttpTransport;
        use crate::core::testing::{loopback_client, serve_once};

        let (endpoint, _server) =
            serve_once("200 OK", &completion_body("late"), Duration::from_millis(400)).await;
        let transport = Arc::new(HttpTransport::from_client(loopback_client().build().unwrap()));

        let err = ExplanationClient::new(transport, "gsk_test")
            .with_endpoint(endpoint)
            .with_timeout(Duration::from_millis(50))
            .request("slow")
            .await
            .unwrap_err();
        assert_eq!(err, AppError::Timeout(50));
    }

    #[tokio::test]
    async fn test_http_request_outlives_short_delays() {
        use crate::core::explain::HttpTransport;
        use crate::core::testing::{loopback_client, serve_once};

        let (endpoint, _server) =
            serve_once("200 OK", &completion_body("worth the wait"), Duration::from_millis(150)).await;
        let transport = Arc::new(HttpTransport::from_client(loopback_client().build().unwrap()));

        let explanation = ExplanationClient::new(transport, "gsk_test")
            .with_endpoint(endpoint)
            .with_timeout(Duration::from_secs(5))
            .request("patient")
            .await
            .unwrap();
        assert_eq!(explanation, Explanation::Completion("worth the wait".into()));
    }
}
