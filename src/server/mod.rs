//! HTTP service: `POST /upload` returns the extracted text of a PDF.
//!
//! Enabled by the `server` feature. The router is exposed separately from
//! [`serve`] so tests can drive it with `tower::ServiceExt::oneshot`.

mod error;
mod routes;

pub use error::ApiError;

use crate::extract::TextExtractor;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Settings for the HTTP layer.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body. Default: 50 MiB.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    extractor: Arc<TextExtractor>,
}

impl AppState {
    pub fn new(extractor: Arc<TextExtractor>) -> Self {
        Self { extractor }
    }

    pub fn extractor(&self) -> &TextExtractor {
        &self.extractor
    }

    /// Ask the OCR engine whether it is usable, on the blocking pool.
    ///
    /// Engines may spawn a process to answer. A panicked check reports false.
    pub async fn ocr_available(&self) -> bool {
        let extractor = Arc::clone(&self.extractor);
        tokio::task::spawn_blocking(move || extractor.ocr_engine().is_available())
            .await
            .unwrap_or(false)
    }
}

/// Build the service router.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    // Permissive CORS: browser front-ends on any origin may upload.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/upload", post(routes::upload))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until Ctrl+C / SIGTERM.
pub async fn serve(config: ServerConfig, extractor: Arc<TextExtractor>) -> std::io::Result<()> {
    let state = AppState::new(extractor);
    let ocr_name = state.extractor().ocr_engine().name();
    if state.ocr_available().await {
        tracing::info!("OCR engine '{}' is available", ocr_name);
    } else {
        tracing::warn!(
            "OCR engine '{}' is not available; scanned pages will fail",
            ocr_name
        );
    }

    let app = router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("pdf2text listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
