//! Test doubles for the popover's collaborators

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::config::build_prompt;
use crate::core::cache::KeyValueStore;
use crate::core::explain::types::ChatCompletionRequest;
use crate::core::explain::CompletionTransport;
use crate::shared::error::{AppError, AppResult};

/// Body of a completion reply whose first choice says `content`
pub fn completion_body(content: &str) -> String {
    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
    .to_string()
}

#[derive(Debug, Clone)]
pub struct CapturedCall {
    pub endpoint: String,
    pub api_key: String,
    pub request: ChatCompletionRequest,
}

enum Scripted {
    Ready(AppResult<String>),
    Gated(oneshot::Receiver<AppResult<String>>),
}

/// Transport answering per selection text. Unscripted texts never resolve.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, Scripted>>,
    captured: Mutex<Vec<CapturedCall>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every request for `text` with `result`
    pub fn respond(&self, text: &str, result: AppResult<String>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(build_prompt(text), Scripted::Ready(result));
    }

    /// Hold the next request for `text` until the returned sender fires
    pub fn gate(&self, text: &str) -> oneshot::Sender<AppResult<String>> {
        let (tx, rx) = oneshot::channel();
        self.scripts
            .lock()
            .unwrap()
            .insert(build_prompt(text), Scripted::Gated(rx));
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn captured(&self) -> Vec<CapturedCall> {
        self.captured.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionTransport for ScriptedTransport {
    async fn send(
        &self,
        endpoint: &str,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.captured.lock().unwrap().push(CapturedCall {
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            request: request.clone(),
        });

        let prompt = request
            .messages
            .first()
            .map(|m| m.content.clone())
            .unwrap_or_default();

        let gate = {
            let mut scripts = self.scripts.lock().unwrap();
            if let Some(Scripted::Ready(result)) = scripts.get(&prompt) {
                return result.clone();
            }
            match scripts.remove(&prompt) {
                Some(Scripted::Gated(rx)) => Some(rx),
                _ => None,
            }
        };

        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(AppError::Network("gate dropped".into()))),
            None => std::future::pending().await,
        }
    }
}

/// Storage whose every operation fails
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _slot: &str) -> AppResult<Option<String>> {
        Err(AppError::Storage("storage unavailable".into()))
    }

    fn set(&self, _slot: &str, _value: &str) -> AppResult<()> {
        Err(AppError::Storage("storage unavailable".into()))
    }
}

/// reqwest client builder that talks to loopback directly
pub fn loopback_client() -> reqwest::ClientBuilder {
    reqwest::Client::builder().no_proxy()
}

/// Single-request HTTP server on 127.0.0.1.
///
/// Answers with `status` and a JSON `body` after `delay`, and yields the raw
/// request it read. Returns the completion endpoint URL to point clients at.
pub async fn serve_once(
    status: &str,
    body: &str,
    delay: Duration,
) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!(
        "http://{}/v1/chat/completions",
        listener.local_addr().unwrap()
    );
    let response = format!(
        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            if request_complete(&raw) {
                break;
            }
        }

        tokio::time::sleep(delay).await;
        // The client may have given up already
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
        String::from_utf8_lossy(&raw).into_owned()
    });

    (endpoint, handle)
}

fn request_complete(raw: &[u8]) -> bool {
    let Some(end) = raw.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(&raw[..end]).to_ascii_lowercase();
    let length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    raw.len() >= end + 4 + length
}
