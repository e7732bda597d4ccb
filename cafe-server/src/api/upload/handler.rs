//! Image Upload Handler
//!
//! Accepts menu item images from the dashboard and serves them back to the
//! public menu. Files are stored on local disk under the work directory.

use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path as AxumPath, State},
    http::{StatusCode, header},
    response::Response,
};
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// Maximum file size (5MB)
const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Supported image formats
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_id: String,
    pub filename: String,
    pub original_name: String,
    pub size: usize,
    pub url: String,
}

/// Validate an uploaded image file
fn validate_image(data: &[u8], ext: &str) -> Result<(), AppError> {
    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::validation(format!(
            "File too large. Maximum size is {}MB",
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    let ext_lower = ext.to_lowercase();
    if !SUPPORTED_FORMATS.contains(&ext_lower.as_str()) {
        return Err(AppError::validation(format!(
            "Unsupported file format '{}'. Supported: {}",
            ext_lower,
            SUPPORTED_FORMATS.join(", ")
        )));
    }

    Ok(())
}

/// POST /api/upload - 上传商品图片
pub async fn upload(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let images_dir = state.uploads_dir();
    tokio::fs::create_dir_all(&images_dir)
        .await
        .map_err(|e| AppError::internal(format!("Failed to create images directory: {}", e)))?;

    // Find the file field
    let mut field_data: Option<Vec<u8>> = None;
    let mut original_filename = None;

    while let Some(f) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart request: {}", e)))?
    {
        let name = f.name().map(|s| s.to_string());
        if name.as_deref() == Some("file") || name.as_deref() == Some("image") {
            original_filename = f.file_name().map(|s| s.to_string());
            field_data = Some(
                f.bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Multipart error: {}", e)))?
                    .to_vec(),
            );
            break;
        }
    }

    let data = field_data
        .ok_or_else(|| AppError::validation("No 'file' field found. Field name must be 'file'"))?;
    let filename = original_filename
        .ok_or_else(|| AppError::validation("No filename provided in file field"))?;

    if data.is_empty() {
        return Err(AppError::validation("Empty file provided"));
    }

    let ext = PathBuf::from(&filename)
        .extension()
        .and_then(|ext| ext.to_str().map(|s| s.to_lowercase()))
        .ok_or_else(|| AppError::validation(format!("Invalid file extension for: {}", filename)))?;

    validate_image(&data, &ext)?;

    // Unique filename; uploads are never overwritten
    let file_id = Uuid::new_v4().to_string();
    let new_filename = format!("{}.{}", file_id, ext);
    let file_path = images_dir.join(&new_filename);

    tokio::fs::write(&file_path, &data)
        .await
        .map_err(|e| AppError::internal(format!("Failed to save file: {}", e)))?;

    tracing::info!(
        original_name = %filename,
        size = data.len(),
        file = %new_filename,
        "Image uploaded"
    );

    let url = format!("/api/image/{}", new_filename);
    Ok(Json(UploadResponse {
        file_id,
        filename: new_filename,
        original_name: filename,
        size: data.len(),
        url,
    }))
}

/// GET /api/image/:filename - 读取已上传图片 (公共)
pub async fn serve_image(
    State(state): State<ServerState>,
    AxumPath(filename): AxumPath<String>,
) -> AppResult<Response> {
    // Reject anything that could escape the images directory
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Err(AppError::validation("Invalid filename"));
    }

    let file_path = state.uploads_dir().join(&filename);
    let data = tokio::fs::read(&file_path)
        .await
        .map_err(|_| AppError::not_found(format!("Image {}", filename)))?;

    let mime = mime_guess::from_path(&filename).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .body(Body::from(data))
        .map_err(|e| AppError::internal(format!("Failed to build response: {}", e)))
}
