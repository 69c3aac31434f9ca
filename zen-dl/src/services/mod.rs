//! Extraction services
//!
//! The request pipeline ([`download`]) and the collaborators it is built
//! from: URL validation, the extractor command line, the process runner,
//! stderr classification, artifact storage and title sanitization.

pub mod download;
pub mod error_classifier;
pub mod extractor;
pub mod sanitize;
pub mod storage;
pub mod tool_runner;
pub mod url_validator;

pub use download::{CompletedJob, DownloadService, JobState};
pub use error_classifier::{ClassificationRule, StderrClassifier};
pub use extractor::ExtractorConfig;
pub use storage::{ArtifactStore, FilePattern, FsArtifactStore, MemoryArtifactStore, StoreError};
pub use tool_runner::{ProcessRunner, RunError, ToolInvocation, ToolOutput, ToolRunner};
