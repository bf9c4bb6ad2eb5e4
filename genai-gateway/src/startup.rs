//! Application startup and lifecycle management.

use crate::config::GatewayConfig;
use crate::handlers;
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::TextProvider;
use crate::services::UploadStore;
use axum::{extract::DefaultBodyLimit, middleware, routing::post, Router};
use service_core::error::AppError;
use service_core::middleware::request_id_middleware;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultOnFailure, TraceLayer};
use tracing::Level;

/// Shared application state.
///
/// Built once at startup; every field is an immutable handle shared by all
/// requests.
#[derive(Clone)]
pub struct AppState {
    pub config: GatewayConfig,
    pub provider: Arc<dyn TextProvider>,
    /// Client used to fetch images by URL.
    pub http_client: reqwest::Client,
    pub uploads: Arc<UploadStore>,
}

/// Build the gateway router over the given state.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.uploads.max_bytes;

    Router::new()
        .route("/generate-text", post(handlers::generate_text))
        .route("/generate-image-text", post(handlers::generate_image_text))
        .route(
            "/generate-image-from-url",
            post(handlers::generate_image_from_url),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        // Failed requests are already logged at error level by `AppError`.
        .layer(
            TraceLayer::new_for_http().on_failure(DefaultOnFailure::new().level(Level::DEBUG)),
        )
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    state: AppState,
}

impl Application {
    /// Build the application against the Gemini API.
    pub async fn build(config: GatewayConfig) -> Result<Self, AppError> {
        let http_client = reqwest::Client::new();

        let gemini_config = GeminiConfig {
            api_key: config.google.api_key.clone(),
            model: config.models.text_model.clone(),
            api_base: config.google.api_base.clone(),
        };
        let provider: Arc<dyn TextProvider> =
            Arc::new(GeminiTextProvider::new(gemini_config, http_client.clone()));

        tracing::info!(
            model = %config.models.text_model,
            "Initialized Gemini text provider"
        );

        Self::build_with_provider(config, provider, http_client).await
    }

    /// Build the application with an explicit provider.
    pub async fn build_with_provider(
        config: GatewayConfig,
        provider: Arc<dyn TextProvider>,
        http_client: reqwest::Client,
    ) -> Result<Self, AppError> {
        let uploads = UploadStore::new(&config.uploads.dir).await.map_err(|e| {
            tracing::error!(
                "Failed to initialize upload directory {}: {}",
                config.uploads.dir,
                e
            );
            e
        })?;

        let state = AppState {
            config: config.clone(),
            provider,
            http_client,
            uploads: Arc::new(uploads),
        };

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            router: router(state.clone()),
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }

    /// Run until `shutdown` resolves, letting in-flight requests finish.
    pub async fn run_with_shutdown<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
