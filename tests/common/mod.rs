//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use api_gateway::config::schema::{GatewayConfig, RouteConfig, ServiceConfig};
use api_gateway::http::Gateway;
use api_gateway::lifecycle::Shutdown;

/// Read a request head (through the blank line) from the socket.
async fn read_request_head(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(_) => return None,
        }
    }
    Some(String::from_utf8_lossy(&buf).into_owned())
}

async fn write_response(socket: &mut TcpStream, status_line: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// Start a backend that echoes the request head back in the response body.
///
/// The body is the raw request head: the request line ("GET /42 HTTP/1.1")
/// followed by one header per line, so tests can assert on the forwarded
/// path and headers. Returns the address the backend is listening on.
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        if let Some(head) = read_request_head(&mut socket).await {
                            write_response(&mut socket, "200 OK", &head).await;
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a backend that returns a fixed response body.
pub async fn start_mock_backend(response: &'static str) -> SocketAddr {
    start_slow_backend(Duration::ZERO, response).await
}

/// Start a backend that waits before answering with a fixed body.
pub async fn start_slow_backend(delay: Duration, response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        if read_request_head(&mut socket).await.is_some() {
                            tokio::time::sleep(delay).await;
                            write_response(&mut socket, "200 OK", response).await;
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a backend that accepts connections but never responds.
pub async fn start_hanging_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    tokio::spawn(async move {
                        let _held_open = socket;
                        tokio::time::sleep(Duration::from_secs(3600)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a backend that accepts connections and closes them immediately.
pub async fn start_eof_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let _ = socket.shutdown().await;
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// An address nothing is listening on.
pub async fn refused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn route(path: &str, methods: &[&str]) -> RouteConfig {
    RouteConfig {
        path: path.to_string(),
        methods: methods.iter().map(|m| m.to_string()).collect(),
        strip_path: false,
        timeout: None,
    }
}

pub fn service(name: &str, base_path: &str, target: SocketAddr, routes: Vec<RouteConfig>) -> ServiceConfig {
    ServiceConfig {
        name: name.to_string(),
        base_path: base_path.to_string(),
        target_url: format!("http://{target}"),
        routes,
    }
}

pub fn gateway_config(services: Vec<ServiceConfig>) -> GatewayConfig {
    let mut config = GatewayConfig {
        services,
        ..GatewayConfig::default()
    };
    config.observability.metrics_enabled = false;
    config
}

/// Everything a test needs to drive a running gateway.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a gateway on an ephemeral port and wait until it answers.
pub async fn start_gateway(config: GatewayConfig) -> TestGateway {
    let gateway = Gateway::new(&config).expect("initial config must build");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (update_tx, update_rx) = mpsc::unbounded_channel();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = gateway.run(listener, update_rx, server_shutdown).await;
    });

    wait_healthy(addr).await;

    TestGateway {
        addr,
        shutdown,
        update_tx,
    }
}

/// Poll the health endpoint until the gateway is serving.
pub async fn wait_healthy(addr: SocketAddr) {
    let client = test_client();
    for _ in 0..50 {
        if let Ok(response) = client.get(format!("http://{addr}/health")).send().await {
            if response.status() == 200 {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("gateway at {addr} never became healthy");
}

/// Client that never routes through an environment proxy.
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
