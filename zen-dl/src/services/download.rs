//! Extraction request handling
//!
//! One request is one job:
//! `received → validated → extracting → {succeeded | failed(reason)}`.
//! Nothing is retried; the first failure ends the job.

use anyhow::Context;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use zen_common::JobId;

use super::error_classifier::StderrClassifier;
use super::extractor::{self, ExtractorConfig};
use super::sanitize::sanitize_title;
use super::storage::{ArtifactStore, FilePattern, ARTIFACT_EXTENSION};
use super::tool_runner::{RunError, ToolRunner};
use super::url_validator;
use crate::error::{ApiError, ApiResult};

/// Job lifecycle state, used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Received,
    Validated,
    Extracting,
    Succeeded,
    Failed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Received => "received",
            JobState::Validated => "validated",
            JobState::Extracting => "extracting",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A finished extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedJob {
    pub job_id: JobId,
    /// Sanitized display title
    pub title: String,
    /// Artifact name as stored
    pub filename: String,
}

/// Runs extraction jobs against an artifact store and a tool runner
#[derive(Clone)]
pub struct DownloadService {
    store: Arc<dyn ArtifactStore>,
    runner: Arc<dyn ToolRunner>,
    extractor: ExtractorConfig,
    classifier: Arc<StderrClassifier>,
    /// Parent of every job's cancellation token
    shutdown: CancellationToken,
}

impl DownloadService {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        runner: Arc<dyn ToolRunner>,
        extractor: ExtractorConfig,
        classifier: StderrClassifier,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            runner,
            extractor,
            classifier: Arc::new(classifier),
            shutdown,
        }
    }

    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    /// Handle one download request end to end
    ///
    /// Extraction runs on its own task: dropping the returned future (client
    /// disconnect) leaves the job running until it finishes, times out, or
    /// the service shuts down.
    pub async fn process(&self, raw_url: &str) -> ApiResult<CompletedJob> {
        debug!(state = %JobState::Received, "Download request received");

        let url = match url_validator::validate(raw_url) {
            Ok(url) => url.to_string(),
            Err(rejection) => {
                info!(state = %JobState::Failed, reason = ?rejection, "Rejected download URL");
                return Err(ApiError::Validation(rejection.message().to_string()));
            }
        };

        let job_id = JobId::generate();
        debug!(job_id = %job_id, url = %url, state = %JobState::Validated, "URL accepted");

        let service = self.clone();
        let task_job_id = job_id.clone();
        let task = tokio::spawn(async move { service.run_job(url, task_job_id).await });

        match task.await {
            Ok(result) => result,
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Extraction task for job {} did not complete", job_id))
                .into()),
        }
    }

    async fn run_job(&self, url: String, job_id: JobId) -> ApiResult<CompletedJob> {
        match self.extract(&url, &job_id).await {
            Ok(job) => {
                info!(
                    job_id = %job_id,
                    filename = %job.filename,
                    state = %JobState::Succeeded,
                    "Extraction complete"
                );
                Ok(job)
            }
            Err(err) => {
                warn!(job_id = %job_id, url = %url, state = %JobState::Failed, "Extraction failed: {}", err);
                Err(err)
            }
        }
    }

    async fn extract(&self, url: &str, job_id: &JobId) -> ApiResult<CompletedJob> {
        let template = extractor::output_template(self.store.root(), job_id);
        let invocation = extractor::build_invocation(&self.extractor, url, &template);

        info!(job_id = %job_id, url, state = %JobState::Extracting, "Running {}", invocation.program);

        let output = match self.runner.run(&invocation, self.shutdown.child_token()).await {
            Ok(output) => output,
            Err(RunError::Timeout(limit)) => {
                error!(job_id = %job_id, url, "Extractor timed out after {:?}", limit);
                return Err(ApiError::ToolTimeout);
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Running extractor for job {}", job_id))
                    .into());
            }
        };

        if !output.success {
            let stderr = output.stderr.trim();
            error!(
                job_id = %job_id,
                url,
                exit_code = ?output.exit_code,
                "Extractor failed: {}",
                stderr
            );
            return Err(ApiError::ToolReported(self.classifier.classify(stderr).to_string()));
        }

        let pattern = FilePattern::job_artifacts(job_id)
            .with_context(|| format!("Building artifact pattern for job {}", job_id))?;
        let mut candidates = self
            .store
            .list(&pattern)
            .await
            .with_context(|| format!("Listing artifacts matching {}", pattern.as_str()))?;

        if candidates.is_empty() {
            error!(job_id = %job_id, "Extractor exited 0 but nothing matches {}", pattern.as_str());
            return Err(ApiError::ArtifactMissing(job_id.to_string()));
        }
        if candidates.len() > 1 {
            warn!(
                job_id = %job_id,
                count = candidates.len(),
                "Multiple artifacts match {}, using {}",
                pattern.as_str(),
                candidates[0]
            );
        }

        let filename = candidates.swap_remove(0);
        let title = title_from_filename(&filename, job_id);

        Ok(CompletedJob {
            job_id: job_id.clone(),
            title,
            filename,
        })
    }
}

/// Display title: filename without extension and job prefix, sanitized
pub fn title_from_filename(filename: &str, job_id: &JobId) -> String {
    let stem = filename
        .strip_suffix(&format!(".{}", ARTIFACT_EXTENSION))
        .or_else(|| filename.rsplit_once('.').map(|(stem, _)| stem))
        .unwrap_or(filename);
    let prefix = job_id.file_prefix();
    let title = stem.strip_prefix(prefix.as_str()).unwrap_or(stem);
    sanitize_title(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_from_filename() {
        let id = JobId::parse("1a2b3c4d").unwrap();
        assert_eq!(title_from_filename("1a2b3c4d_My Song.mp3", &id), "My Song");
        assert_eq!(title_from_filename("1a2b3c4d_v1.2 mix.mp3", &id), "v1.2 mix");
        assert_eq!(title_from_filename("1a2b3c4d_Who? What|.mp3", &id), "Who What");
        assert_eq!(title_from_filename("other_Song.mp3", &id), "other_Song");
    }

    #[test]
    fn test_job_state_display() {
        assert_eq!(JobState::Extracting.to_string(), "extracting");
        assert_eq!(JobState::Failed.to_string(), "failed");
    }
}
