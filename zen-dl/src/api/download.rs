//! Download endpoint
//!
//! POST /api/download `{"url": "..."}`

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::services::CompletedJob;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
}

/// Successful download response
#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub status: &'static str,
    pub title: String,
    pub download_link: String,
    pub filename: String,
}

impl From<CompletedJob> for DownloadResponse {
    fn from(job: CompletedJob) -> Self {
        Self {
            status: "success",
            title: job.title,
            download_link: download_link(&job.filename),
            filename: job.filename,
        }
    }
}

/// Link under `/downloads/` with the filename percent-encoded as one path segment
///
/// Titles routinely contain `#`, `?` and spaces; left raw they would end the path.
pub fn download_link(filename: &str) -> String {
    format!("/downloads/{}", urlencoding::encode(filename))
}

/// POST /api/download
///
/// Blocks until the extractor finishes or times out.
pub async fn download_audio(
    State(state): State<AppState>,
    Json(request): Json<DownloadRequest>,
) -> ApiResult<Json<DownloadResponse>> {
    let job = state.downloads.process(&request.url).await?;
    Ok(Json(job.into()))
}

pub fn download_routes() -> Router<AppState> {
    Router::new().route("/api/download", post(download_audio))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_link_encodes_filename() {
        assert_eq!(download_link("1a2b3c4d_Song.mp3"), "/downloads/1a2b3c4d_Song.mp3");
        assert_eq!(
            download_link("1a2b3c4d_Track #1 ?.mp3"),
            "/downloads/1a2b3c4d_Track%20%231%20%3F.mp3"
        );
        assert_eq!(download_link("1a2b3c4d_50%.mp3"), "/downloads/1a2b3c4d_50%25.mp3");
    }
}
