//! Artifact storage
//!
//! The downloads directory is flat and shared by every job. It is reached
//! only through [`ArtifactStore`] so handlers can run against an in-memory
//! store in tests.

use async_trait::async_trait;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use zen_common::JobId;

/// Artifact extension produced by the extractor
pub const ARTIFACT_EXTENSION: &str = "mp3";

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// No artifact with this name
    #[error("Artifact not found: {0}")]
    NotFound(String),

    /// Name is empty or would escape the store directory
    #[error("Invalid artifact name: {0}")]
    InvalidName(String),

    /// Underlying filesystem error
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Filename pattern with `*` wildcards (no path separators)
#[derive(Debug, Clone)]
pub struct FilePattern {
    glob: String,
    regex: Regex,
}

impl FilePattern {
    /// Compile a glob such as `1a2b3c4d_*.mp3`
    pub fn parse(glob: &str) -> Result<Self, regex::Error> {
        let body = glob
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("[^/]*");
        Ok(Self {
            glob: glob.to_string(),
            regex: Regex::new(&format!("^{}$", body))?,
        })
    }

    /// `{job_id}_*.mp3`
    pub fn job_artifacts(job_id: &JobId) -> Result<Self, regex::Error> {
        Self::parse(&format!("{}*.{}", job_id.file_prefix(), ARTIFACT_EXTENSION))
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        &self.glob
    }
}

/// Reject names that are empty or could address anything outside the store
pub fn validate_name(name: &str) -> Result<(), StoreError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Flat artifact storage
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Directory the extractor is told to write into
    fn root(&self) -> &Path;

    /// Create or replace an artifact
    async fn write(&self, name: &str, data: &[u8]) -> Result<(), StoreError>;

    /// Names matching `pattern`, sorted lexicographically
    async fn list(&self, pattern: &FilePattern) -> Result<Vec<String>, StoreError>;

    /// Full contents of an artifact
    async fn read(&self, name: &str) -> Result<Vec<u8>, StoreError>;
}

/// Artifact store backed by a directory on disk
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn write(&self, name: &str, data: &[u8]) -> Result<(), StoreError> {
        validate_name(name)?;
        tokio::fs::write(self.root.join(name), data).await?;
        Ok(())
    }

    async fn list(&self, pattern: &FilePattern) -> Result<Vec<String>, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    debug!("Skipping non-UTF-8 filename {:?}", raw);
                    continue;
                }
            };
            // Other jobs share the directory; only stat what could be ours
            if pattern.matches(&name) && is_regular_file(&name, entry.file_type().await) {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    async fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        validate_name(name)?;
        match tokio::fs::read(self.root.join(name)).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// An entry that vanished or cannot be inspected is skipped, not fatal
fn is_regular_file(name: &str, file_type: std::io::Result<std::fs::FileType>) -> bool {
    match file_type {
        Ok(file_type) => file_type.is_file(),
        Err(e) => {
            debug!("Skipping {}: {}", name, e);
            false
        }
    }
}

/// In-memory artifact store for tests
#[derive(Debug)]
pub struct MemoryArtifactStore {
    root: PathBuf,
    files: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl Default for MemoryArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("downloads"),
            files: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of stored artifacts
    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn write(&self, name: &str, data: &[u8]) -> Result<(), StoreError> {
        validate_name(name)?;
        self.files.write().await.insert(name.to_string(), data.to_vec());
        Ok(())
    }

    async fn list(&self, pattern: &FilePattern) -> Result<Vec<String>, StoreError> {
        // BTreeMap keys are already sorted
        Ok(self
            .files
            .read()
            .await
            .keys()
            .filter(|name| pattern.matches(name))
            .cloned()
            .collect())
    }

    async fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        validate_name(name)?;
        self.files
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }
}
