//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use epp_gateway::config::{FailureMode, GatewayConfig, InternalLocationConfig, LocationConfig};
use epp_gateway::resolver::{EndpointResolver, ResolutionRequest, ResolveError};

pub const INTERNAL_PATH: &str = "/_epp/pool-a";

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` receives the request line (e.g. `GET /v1/chat?x=1 HTTP/1.1`) and
/// returns the status and body to answer with.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut head = Vec::new();
                        let mut buf = [0u8; 1024];
                        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut buf).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => head.extend_from_slice(&buf[..n]),
                            }
                        }
                        let text = String::from_utf8_lossy(&head).into_owned();
                        let request_line = text.lines().next().unwrap_or_default().to_string();

                        // Drain the body so closing does not reset the connection.
                        let head_len = text.find("\r\n\r\n").map(|i| i + 4).unwrap_or(head.len());
                        let content_length = text
                            .lines()
                            .filter_map(|l| l.split_once(':'))
                            .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
                            .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                            .unwrap_or(0);
                        let mut remaining = content_length.saturating_sub(head.len() - head_len);
                        while remaining > 0 {
                            match socket.read(&mut buf).await {
                                Ok(0) | Err(_) => break,
                                Ok(n) => remaining = remaining.saturating_sub(n),
                            }
                        }

                        let (status, body) = f(request_line).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Backend answering `"{name} {request line}"`.
pub async fn start_echo_backend(name: &'static str) -> SocketAddr {
    start_programmable_backend(move |line| async move { (200, format!("{} {}", name, line)) }).await
}

/// Resolver with a fixed answer that records every call it receives.
#[derive(Debug)]
pub struct RecordingResolver {
    answer: Result<String, String>,
    delay: Option<Duration>,
    pub calls: Mutex<Vec<ResolutionRequest>>,
}

impl RecordingResolver {
    pub fn endpoint(endpoint: impl Into<String>) -> Arc<Self> {
        Self::build(Ok(endpoint.into()), None)
    }

    pub fn failing(message: impl Into<String>) -> Arc<Self> {
        Self::build(Err(message.into()), None)
    }

    pub fn slow(endpoint: impl Into<String>, delay: Duration) -> Arc<Self> {
        Self::build(Ok(endpoint.into()), Some(delay))
    }

    fn build(answer: Result<String, String>, delay: Option<Duration>) -> Arc<Self> {
        Arc::new(Self {
            answer,
            delay,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<ResolutionRequest> {
        self.calls.lock().unwrap().last().cloned()
    }
}

impl EndpointResolver for RecordingResolver {
    fn resolve<'a>(
        &'a self,
        request: &'a ResolutionRequest,
    ) -> BoxFuture<'a, Result<String, ResolveError>> {
        self.calls.lock().unwrap().push(request.clone());
        async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.answer.clone().map_err(ResolveError::Engine)
        }
        .boxed()
    }
}

/// Variables a location seeds for the picker at `127.0.0.1:9002`.
pub fn picker_variables(internal_path: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("epp_host".to_string(), "127.0.0.1".to_string()),
        ("epp_port".to_string(), "9002".to_string()),
        ("epp_internal_path".to_string(), internal_path.to_string()),
    ])
}

pub fn location(name: &str, prefix: &str, epp_enabled: bool, variables: BTreeMap<String, String>) -> LocationConfig {
    LocationConfig {
        name: name.to_string(),
        host: None,
        path_prefix: prefix.to_string(),
        priority: 0,
        epp_enabled,
        variables,
        upstream: None,
    }
}

/// One `/v1/` location intercepted to [`INTERNAL_PATH`], plus a plain
/// `/static/` location that passes through to the same internal router.
pub fn gateway_config(failure_mode: FailureMode, fallback: Option<SocketAddr>) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.epp.resolve_timeout_ms = 200;
    config.locations = vec![
        location("llm", "/v1/", true, picker_variables(INTERNAL_PATH)),
        location("static", "/static/", false, picker_variables(INTERNAL_PATH)),
    ];
    config.internal_locations = vec![InternalLocationConfig {
        path: INTERNAL_PATH.to_string(),
        failure_mode,
        fallback_upstream: fallback.map(|a| a.to_string()),
    }];
    config
}
