//! zen-dl library - Zen Downloader HTTP service
//!
//! Accepts a video URL, runs the external extractor, and returns a link to
//! the resulting mp3.

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use services::DownloadService;

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "Zen Downloader";

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Extraction pipeline
    pub downloads: Arc<DownloadService>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(downloads: DownloadService) -> Self {
        Self {
            downloads: Arc::new(downloads),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ui_routes())
        .merge(api::download_routes())
        .merge(api::file_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
