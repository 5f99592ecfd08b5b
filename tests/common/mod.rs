//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::time::Duration;

use qr_service::{HttpServer, QrHandler, ServiceConfig, Shutdown};

/// A running service; shuts down when dropped.
pub struct TestService {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestService {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the service on an ephemeral port with the given config.
pub async fn start_service(config: ServiceConfig) -> TestService {
    let server = HttpServer::new(config);
    serve(server).await
}

/// Start the service around a custom handler.
#[allow(dead_code)]
pub async fn start_service_with_handler(handler: QrHandler) -> TestService {
    let server = HttpServer::with_handler(ServiceConfig::default(), handler);
    serve(server).await
}

async fn serve(server: HttpServer) -> TestService {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    wait_until_ready(addr).await;
    TestService { addr, shutdown }
}

async fn wait_until_ready(addr: SocketAddr) {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    for _ in 0..50 {
        if client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .is_ok()
        {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("service on {} never became ready", addr);
}

/// Client that never goes through a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}
