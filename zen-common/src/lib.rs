//! # Zen Downloader Common Library
//!
//! Shared code for the Zen Downloader service:
//! - Error and result types
//! - Configuration loading (CLI > ENV > TOML > compiled default)
//! - Job id generation

pub mod config;
pub mod error;
pub mod job_id;

pub use error::{Error, Result};
pub use job_id::JobId;
