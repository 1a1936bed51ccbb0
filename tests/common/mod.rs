#![allow(dead_code)]

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use minivault::api;
use minivault::generators::{BackendClient, Generator, StubGenerator};
use minivault::models::error::LogWriteError;
use minivault::models::types::InteractionRecord;
use minivault::services::Dispatcher;
use minivault::traits::interaction_log::InteractionLog;

pub const TEST_MODEL: &str = "phi3:mini";

/// In-memory log that remembers every appended record.
#[derive(Default)]
pub struct RecordingLog {
    records: Mutex<Vec<InteractionRecord>>,
}

impl RecordingLog {
    pub fn records(&self) -> Vec<InteractionRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl InteractionLog for RecordingLog {
    async fn append(&self, record: &InteractionRecord) -> Result<(), LogWriteError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Log whose storage is always unavailable.
#[derive(Default)]
pub struct BrokenLog;

#[async_trait]
impl InteractionLog for BrokenLog {
    async fn append(&self, _record: &InteractionRecord) -> Result<(), LogWriteError> {
        Err(LogWriteError::Io(std::io::Error::other("disk unavailable")))
    }
}

pub fn backend_client(base_url: &str, timeout: Duration) -> Arc<BackendClient> {
    Arc::new(
        BackendClient::builder()
            .base_url(base_url)
            .model(TEST_MODEL)
            .system_prompt("You are a test assistant.")
            .timeout(timeout)
            .build(),
    )
}

pub fn dispatcher_with(backend: Arc<dyn Generator>, log: Arc<dyn InteractionLog>) -> Arc<Dispatcher> {
    Arc::new(
        Dispatcher::builder()
            .stub(Arc::new(StubGenerator::new().unwrap()))
            .backend(backend)
            .interaction_log(log)
            .build(),
    )
}

/// Address on which nothing listens.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

pub fn chat_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "model": TEST_MODEL,
        "created_at": "2024-06-01T12:00:00Z",
        "message": { "role": "assistant", "content": content },
        "done": true
    })
}

pub async fn mount_chat(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(content)))
        .mount(server)
        .await;
}

pub async fn mount_chat_status(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

pub fn read_log(path: &Path) -> Vec<InteractionRecord> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap_or_else(|e| panic!("malformed log line {line:?}: {e}")))
        .collect()
}

/// Real HTTP server on an ephemeral port.
pub struct TestServer {
    pub base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<std::io::Result<()>>>,
}

impl TestServer {
    pub async fn start(dispatcher: Arc<Dispatcher>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(api::serve(listener, dispatcher, async move {
            let _ = rx.await;
        }));
        Self { base_url, shutdown: Some(tx), handle: Some(handle) }
    }

    pub fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await.unwrap().unwrap();
        }
    }
}
