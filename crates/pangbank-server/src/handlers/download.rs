//! File download responses.

use std::path::Path;

use axum::{
    body::Body,
    http::{Response, StatusCode, header},
};
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::error::ApiError;

/// Streams a file from disk as an attachment named `download_name`.
///
/// A missing file is a 404; the body is read in chunks, never buffered whole.
pub async fn stream_file(path: &Path, download_name: &str) -> Result<Response<Body>, ApiError> {
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("File not found on disk: {}", path.display());
            return Err(ApiError::NotFound(format!(
                "File {} not found",
                download_name
            )));
        }
        Err(e) => {
            return Err(ApiError::Internal(format!(
                "Failed to open {}: {}",
                path.display(),
                e
            )));
        }
    };

    let length = file
        .metadata()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to read file metadata: {}", e)))?
        .len();

    let body = Body::from_stream(ReaderStream::new(file));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, length)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", download_name),
        )
        .body(body)
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
