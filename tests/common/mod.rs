//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use staging_server::config::ServerConfig;
use staging_server::http::HttpServer;
use staging_server::lifecycle::{Shutdown, ShutdownCoordinator, TeardownReport};
use staging_server::net::{listener, tls};
use staging_server::staging::StagingArea;
use tokio::task::JoinHandle;

/// A server running against a temporary process root.
pub struct TestServer {
    pub addr: SocketAddr,
    pub scheme: &'static str,
    pub shutdown: Shutdown,
    pub staging: Arc<StagingArea>,
    pub coordinator: Arc<ShutdownCoordinator>,
    pub task: JoinHandle<TeardownReport>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}://{}{}", self.scheme, self.addr, path)
    }
}

pub fn test_config(root: &Path) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.host = "127.0.0.1".to_string();
    config.listener.port = 0;
    config.listener.tls.enabled = false;
    config.staging.root = Some(root.to_path_buf());
    config.staging.teardown_timeout_secs = 5;
    config.timeouts.shutdown_drain_secs = 1;
    config
}

/// Start a plain-HTTP server and wait until it answers requests.
pub async fn start_server(root: &Path) -> TestServer {
    start(root, test_config(root)).await
}

/// Start an HTTPS server with a self-signed pair under `<root>/ssl/`.
pub async fn start_tls_server(root: &Path) -> TestServer {
    write_self_signed(&root.join("ssl"));
    let mut config = test_config(root);
    config.listener.tls.enabled = true;
    start(root, config).await
}

fn write_self_signed(dir: &Path) {
    let rcgen::CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("cert.pem"), cert.pem()).unwrap();
    std::fs::write(dir.join("key.pem"), key_pair.serialize_pem()).unwrap();
}

async fn start(root: &Path, config: ServerConfig) -> TestServer {
    let staging = Arc::new(StagingArea::from_config(&config.staging).unwrap());
    let coordinator = Arc::new(ShutdownCoordinator::new(
        Arc::clone(&staging),
        Duration::from_secs(config.staging.teardown_timeout_secs),
    ));
    let shutdown = Shutdown::new();

    let tls_config = if config.listener.tls.enabled {
        let cert = tls::resolve_path(root, &config.listener.tls.cert_path);
        let key = tls::resolve_path(root, &config.listener.tls.key_path);
        Some(tls::load_tls_config(&cert, &key).await.unwrap())
    } else {
        None
    };
    let scheme = if tls_config.is_some() { "https" } else { "http" };

    let listener = listener::bind(&config.listener).unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config, Arc::clone(&staging), Arc::clone(&coordinator));
    let task = tokio::spawn(server.run(listener, tls_config, shutdown.subscribe()));

    let server = TestServer {
        addr,
        scheme,
        shutdown,
        staging,
        coordinator,
        task,
    };
    wait_until_ready(&server).await;
    server
}

async fn wait_until_ready(server: &TestServer) {
    let client = client();
    for _ in 0..50 {
        if let Ok(res) = client.get(server.url("/")).send().await {
            if res.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("server at {} never became ready", server.addr);
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .danger_accept_invalid_certs(true)
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}
