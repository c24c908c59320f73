//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceExt;
use tracewire::observability::logging;
use tracewire::{HttpMetrics, HttpServer, ServiceConfig, Shutdown};

/// An in-process app plus the registry behind it.
pub struct TestApp {
    pub router: Router,
    pub metrics: Arc<HttpMetrics>,
}

pub fn test_app(config: ServiceConfig) -> TestApp {
    let metrics = Arc::new(HttpMetrics::new(config.metrics.clone()).unwrap());
    metrics.initialize();
    let server = HttpServer::new(config, metrics.clone());
    TestApp {
        router: server.router(),
        metrics,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn trace_header(&self) -> String {
        self.headers
            .get("x-trace-id")
            .expect("missing X-Trace-ID header")
            .to_str()
            .unwrap()
            .to_owned()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).unwrap()
    }
}

/// Send one request through `router` without a socket.
pub async fn send(router: &Router, method: &str, uri: &str) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    TestResponse { status, headers, body }
}

pub async fn get(router: &Router, uri: &str) -> TestResponse {
    send(router, "GET", uri).await
}

/// In-memory log sink for the line formatter.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    /// Route this thread's `tracing` events into the buffer until the guard drops.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        tracing::subscriber::set_default(logging::line_subscriber(move || writer.clone()))
    }

    pub fn lines(&self) -> Vec<String> {
        String::from_utf8(self.0.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    /// Messages (everything after `<timestamp> - <LEVEL> - `) containing `needle`.
    pub fn messages_with(&self, needle: &str) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|line| line.splitn(3, " - ").nth(2).map(str::to_owned))
            .filter(|message| message.contains(needle))
            .collect()
    }
}

/// A server on an ephemeral port; shuts down when dropped.
pub struct RunningServer {
    pub addr: SocketAddr,
    pub metrics: Arc<HttpMetrics>,
    shutdown: Shutdown,
}

impl RunningServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn spawn_server(mut config: ServiceConfig) -> RunningServer {
    config.listener.bind_address = "127.0.0.1:0".to_string();
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let metrics = Arc::new(HttpMetrics::new(config.metrics.clone()).unwrap());
    metrics.initialize();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, metrics.clone());
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    RunningServer {
        addr,
        metrics,
        shutdown,
    }
}
