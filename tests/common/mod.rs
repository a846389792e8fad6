//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use chain_router::{HttpServer, Router, ServerConfig, Shutdown};
use tokio::net::TcpListener;

/// A router served on an ephemeral localhost port.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn start(router: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut config = ServerConfig::default();
        config.listener.bind_address = addr.to_string();

        let shutdown = Shutdown::new();
        let receiver = shutdown.subscribe();
        let server = HttpServer::new(config, router);
        let handle = tokio::spawn(async move {
            server.run(listener, receiver).await.unwrap();
        });

        Self { addr, shutdown, handle }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not shut down")
            .unwrap();
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
