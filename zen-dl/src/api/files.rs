//! Artifact serving
//!
//! GET /downloads/:filename reads through the artifact store.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::error::{ApiError, ApiResult};
use crate::services::StoreError;
use crate::AppState;

fn content_type_for(filename: &str) -> &'static str {
    match filename.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

/// GET /downloads/:filename
pub async fn serve_download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    let data = match state.downloads.store().read(&filename).await {
        Ok(data) => data,
        Err(StoreError::InvalidName(name)) => {
            return Err(ApiError::Validation(format!("Invalid filename: {}", name)));
        }
        Err(StoreError::NotFound(name)) => return Err(ApiError::NotFound(name)),
        Err(e) => return Err(anyhow::Error::new(e).into()),
    };

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type_for(&filename))],
        data,
    )
        .into_response())
}

pub fn file_routes() -> Router<AppState> {
    Router::new().route("/downloads/:filename", get(serve_download))
}
