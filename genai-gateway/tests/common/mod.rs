#![allow(dead_code)]

use axum::Router;
use genai_gateway::config::{GatewayConfig, GoogleConfig, ModelConfig, UploadConfig};
use genai_gateway::services::providers::mock::MockTextProvider;
use genai_gateway::services::UploadStore;
use genai_gateway::startup::{router, AppState, Application};
use service_core::config::Config as CoreConfig;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

pub fn test_config() -> GatewayConfig {
    GatewayConfig {
        common: CoreConfig { port: 0 }, // Random port for testing
        google: GoogleConfig {
            api_key: "test-api-key".to_string(),
            api_base: "http://127.0.0.1:1".to_string(),
        },
        models: ModelConfig {
            text_model: "gemini-2.5-flash".to_string(),
        },
        uploads: UploadConfig {
            dir: format!("target/test-uploads-{}", Uuid::new_v4()),
            max_bytes: 1024 * 1024,
        },
    }
}

/// Router over a mock provider, for driving with `oneshot`.
pub async fn test_router(provider: Arc<MockTextProvider>) -> Router {
    let config = test_config();
    let uploads = UploadStore::new(&config.uploads.dir)
        .await
        .expect("Failed to create upload directory");

    router(AppState {
        config,
        provider,
        http_client: reqwest::Client::new(),
        uploads: Arc::new(uploads),
    })
}

pub struct TestApp {
    pub address: String,
    pub upload_dir: PathBuf,
    pub provider: Arc<MockTextProvider>,
}

impl TestApp {
    pub async fn spawn(provider: MockTextProvider) -> Self {
        let provider = Arc::new(provider);
        let config = test_config();
        let upload_dir = PathBuf::from(&config.uploads.dir);

        let app = Application::build_with_provider(
            config,
            provider.clone(),
            reqwest::Client::new(),
        )
        .await
        .expect("Failed to build test application");

        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestApp {
            address,
            upload_dir,
            provider,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Number of files currently staged in the upload directory.
    pub async fn staged_uploads(&self) -> usize {
        let mut entries = tokio::fs::read_dir(&self.upload_dir)
            .await
            .expect("Upload directory should exist");
        let mut count = 0;
        while entries.next_entry().await.unwrap().is_some() {
            count += 1;
        }
        count
    }

    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(&self.upload_dir).await;
    }
}
