//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::{extract::State, http::StatusCode, http::Uri, Router};
use serde_json::json;
use tokio::net::TcpListener;

use notes_api::config::{AuthProvider, NotesConfig};
use notes_api::lifecycle::{build_server, Shutdown};

pub const ALICE_TOKEN: &str = "token-alice";
pub const BOB_TOKEN: &str = "token-bob";
pub const UPSTREAM_KEY: &str = "test-upstream-key";

/// A successful generate-content body carrying `text`.
pub fn summary_body(text: &str) -> String {
    json!({
        "candidates": [{ "content": { "parts": [{ "text": text }], "role": "model" } }]
    })
    .to_string()
}

pub fn error_body(code: u16, message: &str) -> String {
    json!({ "error": { "code": code, "message": message, "status": "ERROR" } }).to_string()
}

#[derive(Clone)]
struct UpstreamState {
    script: Arc<Vec<(u16, String)>>,
    hits: Arc<AtomicU32>,
    queries: Arc<Mutex<Vec<String>>>,
}

/// Scripted stand-in for the generative endpoint. The n-th request gets the
/// n-th scripted answer; the last answer repeats.
pub struct MockUpstream {
    pub addr: SocketAddr,
    hits: Arc<AtomicU32>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl MockUpstream {
    pub async fn start(script: Vec<(u16, String)>) -> Self {
        assert!(!script.is_empty(), "script needs at least one answer");
        let state = UpstreamState {
            script: Arc::new(script),
            hits: Arc::new(AtomicU32::new(0)),
            queries: Arc::new(Mutex::new(Vec::new())),
        };
        let hits = state.hits.clone();
        let queries = state.queries.clone();

        let app = Router::new().fallback(answer).with_state(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, hits, queries }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/v1beta/models/gemini-pro:generateContent", self.addr)
    }

    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

async fn answer(State(state): State<UpstreamState>, uri: Uri) -> (StatusCode, String) {
    let n = state.hits.fetch_add(1, Ordering::SeqCst) as usize;
    state
        .queries
        .lock()
        .unwrap()
        .push(uri.query().unwrap_or_default().to_string());
    let (status, body) = state.script[n.min(state.script.len() - 1)].clone();
    (StatusCode::from_u16(status).unwrap(), body)
}

/// An address nothing listens on.
pub async fn dead_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/v1beta/models/gemini-pro:generateContent", addr)
}

/// Config with static tokens for alice and bob and fast retries.
pub fn test_config(summarizer_endpoint: Option<String>) -> NotesConfig {
    let mut config = NotesConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.auth.provider = AuthProvider::Static;
    config.auth.static_tokens.insert(ALICE_TOKEN.into(), "alice".into());
    config.auth.static_tokens.insert(BOB_TOKEN.into(), "bob".into());
    if let Some(endpoint) = summarizer_endpoint {
        config.summarizer.endpoint = endpoint;
        config.summarizer.api_key = Some(UPSTREAM_KEY.into());
    }
    config.summarizer.base_delay_ms = 10;
    config.summarizer.max_delay_ms = 100;
    config.summarizer.timeout_secs = 5;
    config
}

pub struct TestServer {
    pub base_url: String,
    pub shutdown: Shutdown,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn start(config: NotesConfig) -> Self {
        let server = build_server(config).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown = Shutdown::new();
        let rx = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, rx).await;
        });

        Self {
            base_url: format!("http://{}", addr),
            shutdown,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create a note as `token` and return its id.
    pub async fn create_note(&self, token: &str, title: &str, content: &str) -> String {
        let res = self
            .client
            .post(self.url("/api/notes"))
            .bearer_auth(token)
            .json(&json!({ "title": title, "content": content }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 201);
        let note: serde_json::Value = res.json().await.unwrap();
        note["id"].as_str().unwrap().to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}
