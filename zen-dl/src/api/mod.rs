//! HTTP API handlers for zen-dl

pub mod download;
pub mod files;
pub mod health;
pub mod ui;

pub use download::{download_audio, download_routes, DownloadRequest, DownloadResponse};
pub use files::{file_routes, serve_download};
pub use health::{health_check, health_routes};
pub use ui::{serve_app_js, serve_index, ui_routes};
