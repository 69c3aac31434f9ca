//! Extractor command line
//!
//! Builds the fixed `yt-dlp` argument list for one job: audio only, mp3,
//! best quality, single video, metadata embedded, one output template
//! namespaced by the job id.

use std::path::Path;
use std::time::Duration;
use zen_common::JobId;

use super::storage::ARTIFACT_EXTENSION;
use super::tool_runner::ToolInvocation;

/// Best quality for `--audio-quality`
pub const BEST_AUDIO_QUALITY: &str = "0";

/// Extractor program and limits
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub program: String,
    pub timeout: Duration,
}

/// `{dir}/{job_id}_%(title)s.%(ext)s`
pub fn output_template(dir: &Path, job_id: &JobId) -> String {
    dir.join(format!("{}%(title)s.%(ext)s", job_id.file_prefix()))
        .to_string_lossy()
        .into_owned()
}

/// Full invocation for extracting `url` with the given output template
pub fn build_invocation(config: &ExtractorConfig, url: &str, output_template: &str) -> ToolInvocation {
    let args = [
        "--extract-audio",
        "--audio-format",
        ARTIFACT_EXTENSION,
        "--audio-quality",
        BEST_AUDIO_QUALITY,
        "--output",
        output_template,
        "--no-playlist",
        "--embed-metadata",
        "--add-metadata",
        url,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    ToolInvocation {
        program: config.program.clone(),
        args,
        timeout: config.timeout,
    }
}

/// Value following `--output`, if present
pub fn find_output_template(args: &[String]) -> Option<&str> {
    args.iter()
        .position(|a| a == "--output")
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}
