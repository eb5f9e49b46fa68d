// src/uploads/handlers.rs

use axum::{
    extract::{Extension, Multipart, Path},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use std::path::Path as FsPath;
use std::sync::Arc;
use tokio::fs as tokio_fs;
use tracing::{error, info};

use crate::common::{file_extension, generate_raw_id, sanitize_filename, ApiError, AppState};

/// Public path prefix uploaded files are served under
pub const PUBLIC_PREFIX: &str = "/images";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub url: String,
}

/// POST /api/upload - Store a single file
///
/// Multipart fields: `file` (required), `name` (optional stored file name).
pub async fn upload_file(
    Extension(state): Extension<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut requested_name: Option<String> = None;
    let mut upload: Option<(Option<String>, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("name") => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| ApiError::BadRequest("Failed to read name field".to_string()))?;
                requested_name = Some(text);
            }
            Some("file") => {
                let original = field.file_name().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::BadRequest("Failed to read file data".to_string()))?;
                upload = Some((original, data));
            }
            _ => {}
        }
    }

    let (original, data) =
        upload.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    let filename = stored_filename(
        requested_name.as_deref(),
        original.as_deref(),
        Utc::now().timestamp_millis(),
    );
    save_upload(&state.images_dir, &filename, &data).await?;

    info!(filename = %filename, size = data.len(), "File uploaded");

    Ok(Json(UploadResponse {
        url: public_url(&filename),
        filename,
    }))
}

/// GET /images/:filename - Serve an uploaded file
pub async fn serve_image(
    Extension(state): Extension<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let safe_filename = sanitize_filename(&filename);
    let file_path = state.images_dir.join(&safe_filename);

    let content = match tokio_fs::read(&file_path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound("File not found".to_string()));
        }
        Err(e) => {
            error!(error = %e, file_path = %file_path.display(), "Failed to read uploaded file");
            return Err(ApiError::InternalServer("Failed to read file".to_string()));
        }
    };

    let content_type = content_type_for(&safe_filename, &content);
    let headers = served_headers(&safe_filename, &content_type)?;

    Ok((StatusCode::OK, headers, content))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Client-chosen name when given, otherwise `<millis>_<random><.ext>`
pub fn stored_filename(requested: Option<&str>, original: Option<&str>, millis: i64) -> String {
    if let Some(name) = requested.map(str::trim).filter(|n| !n.is_empty()) {
        return sanitize_filename(name);
    }

    let extension = original.and_then(file_extension).unwrap_or_default();
    format!("{}_{}{}", millis, generate_raw_id(6), extension)
}

/// Raster images render inline; anything else (HTML, SVG, scripts) is forced to
/// download so uploads cannot run in the API origin.
pub fn renders_inline(content_type: &str) -> bool {
    content_type.starts_with("image/") && content_type != "image/svg+xml"
}

/// Response headers for a stored upload. `filename` must already be sanitized.
pub fn served_headers(filename: &str, content_type: &str) -> Result<HeaderMap, ApiError> {
    let invalid = |_| ApiError::InternalServer("Invalid response header".to_string());

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type).map_err(invalid)?,
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=31536000"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    if !renders_inline(content_type) {
        headers.insert(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
                .map_err(invalid)?,
        );
    }
    Ok(headers)
}

pub fn public_url(filename: &str) -> String {
    format!("{}/{}", PUBLIC_PREFIX, filename)
}

pub async fn save_upload(dir: &FsPath, filename: &str, data: &[u8]) -> Result<(), ApiError> {
    tokio_fs::create_dir_all(dir).await.map_err(|e| {
        error!(error = %e, dir = %dir.display(), "Failed to create upload directory");
        ApiError::InternalServer("File upload failed".to_string())
    })?;

    let file_path = dir.join(filename);
    tokio_fs::write(&file_path, data).await.map_err(|e| {
        error!(error = %e, file_path = %file_path.display(), "Failed to save uploaded file");
        ApiError::InternalServer("File upload failed".to_string())
    })
}

/// Sniffed from the bytes first, then from the extension
pub fn content_type_for(filename: &str, data: &[u8]) -> String {
    if let Some(kind) = infer::get(data) {
        return kind.mime_type().to_string();
    }

    let mime = match file_extension(filename).as_deref() {
        Some(".png") => "image/png",
        Some(".gif") => "image/gif",
        Some(".webp") => "image/webp",
        Some(".jpg") | Some(".jpeg") => "image/jpeg",
        Some(".svg") => "image/svg+xml",
        Some(".txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    };
    mime.to_string()
}
