#![allow(dead_code)]

pub mod fake_google;

use indexing_service::config::{GoogleConfig, IndexingConfig};
use indexing_service::services::indexing::INDEXING_API_URL;
use indexing_service::services::{IndexingApi, MockIndexingClient};
use indexing_service::startup::Application;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
}

pub fn test_config() -> IndexingConfig {
    IndexingConfig {
        // Use random port for testing (port 0)
        common: CoreConfig {
            port: 0,
            log_level: "error".to_string(),
            otlp_endpoint: None,
        },
        google: GoogleConfig {
            enabled: false,
            credentials: None,
            api_base_url: INDEXING_API_URL.to_string(),
            request_timeout_secs: Some(5),
        },
    }
}

impl TestApp {
    /// Spawn the service backed by the given mock client.
    pub async fn spawn(mock: Arc<MockIndexingClient>) -> Self {
        Self::spawn_with(mock).await
    }

    pub async fn spawn_with(indexing: Arc<dyn IndexingApi>) -> Self {
        let app = Application::build_with_indexing(test_config(), indexing)
            .await
            .expect("Failed to build test application");
        Self::run(app).await
    }

    pub async fn run(app: Application) -> Self {
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        }

        TestApp {
            address,
            port,
            client,
        }
    }

    pub async fn post_notify(&self, body: impl Into<reqwest::Body>) -> reqwest::Response {
        self.client
            .post(format!("{}/notify", self.address))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}

pub fn article_body(url: &str, title: &str) -> String {
    serde_json::json!({ "payload": { "url": url, "title": title } }).to_string()
}
