//! Image upload handling.
//!
//! Uploaded files land under `<upload_dir>/products/` and are served
//! back at `/uploads/products/...` by the static file layer. Filenames
//! are timestamp-suffixed so re-uploading the same file never clobbers
//! an image a product still references.

use axum::{Json, body::Bytes, extract::Multipart, extract::State};
use chrono::Utc;
use serde::Serialize;

use crate::config::ServerConfig;
use crate::error::{AppError, Result};
use crate::middleware::RequireCatalogWrite;
use crate::state::AppState;

/// Accepted image extensions.
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// An image file pulled out of a multipart form.
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// `POST /api/uploads` - store an image (admin or editor), returning
/// its public URL.
pub async fn upload(
    RequireCatalogWrite(_user): RequireCatalogWrite,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid_field("body", e.to_string(), None))?
    {
        if field.name() == Some("image") {
            let file_name = field.file_name().map(str::to_owned);
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::invalid_field("image", e.to_string(), None))?;
            image = Some(ImageUpload { file_name, data });
        }
    }

    let image = image.ok_or_else(|| {
        AppError::invalid_field("image", "an image file is required", None)
    })?;

    let image_url = store_image(state.config(), &image).await?;
    Ok(Json(UploadResponse { image_url }))
}

/// Write an uploaded image to disk and return its public URL.
///
/// # Errors
///
/// Returns a validation error for a missing or disallowed extension
/// and an internal error if the filesystem write fails.
pub async fn store_image(config: &ServerConfig, image: &ImageUpload) -> Result<String> {
    let file_name = sanitized_file_name(image.file_name.as_deref())?;

    let dir = config.upload_dir.join("products");
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::Internal(format!("failed to create upload directory: {e}")))?;

    tokio::fs::write(dir.join(&file_name), &image.data)
        .await
        .map_err(|e| AppError::Internal(format!("failed to store image: {e}")))?;

    Ok(format!("/uploads/products/{file_name}"))
}

/// Build a collision-free on-disk name from the client's filename.
///
/// The stem is reduced to `[a-z0-9-]` and suffixed with the current
/// timestamp in milliseconds.
fn sanitized_file_name(original: Option<&str>) -> Result<String> {
    let original = original
        .ok_or_else(|| AppError::invalid_field("image", "file name is required", None))?;

    let (stem, extension) = original
        .rsplit_once('.')
        .ok_or_else(|| {
            AppError::invalid_field("image", "file name has no extension", Some(original))
        })?;

    let extension = extension.to_ascii_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::invalid_field(
            "image",
            format!("extension must be one of {}", ALLOWED_EXTENSIONS.join(", ")),
            Some(original),
        ));
    }

    let mut slug = String::with_capacity(stem.len());
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    let stem = if slug.is_empty() { "image" } else { slug };

    Ok(format!(
        "{stem}-{}.{extension}",
        Utc::now().timestamp_millis()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_file_name_keeps_extension() {
        let name = sanitized_file_name(Some("Arrachera Marinada.JPG")).expect("valid");
        assert!(name.starts_with("arrachera-marinada-"));
        assert!(name.ends_with(".jpg"));
    }

    #[test]
    fn test_disallowed_extension_rejected() {
        assert!(sanitized_file_name(Some("script.exe")).is_err());
        assert!(sanitized_file_name(Some("noextension")).is_err());
        assert!(sanitized_file_name(None).is_err());
    }

    #[test]
    fn test_unprintable_stem_falls_back() {
        let name = sanitized_file_name(Some("¡¡¡.png")).expect("valid");
        assert!(name.starts_with("image-"));
        assert!(name.ends_with(".png"));
    }
}
