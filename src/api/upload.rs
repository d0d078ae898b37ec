//! Avatar upload routes.
//!
//! Uploaded photos land in the in-memory avatar cache, not on disk: entries
//! expire after the configured TTL and the durable record is the avatar URL
//! written to the user row.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, get, post, web};
use chrono::Utc;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::{DbPool, users};
use crate::error::{AppError, AppResult};
use crate::services::AvatarCache;

/// Content types accepted for profile photos.
const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/gif"];

/// Served avatars may be cached by clients for 30 minutes, matching the
/// sweep interval so a cached URL never outlives the entry by much.
const AVATAR_CACHE_CONTROL: &str = "public, max-age=1800";

/// Response for a successful profile photo upload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub avatar_url: String,
    pub message: String,
}

/// Check an uploaded content type against the image allowlist.
pub(crate) fn is_allowed_image(content_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&content_type.to_ascii_lowercase().as_str())
}

/// Extension for the generated filename, taken from the client's filename.
pub(crate) fn file_extension(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && !ext.contains('/') => ext,
        _ => "jpg",
    }
}

/// Upload a profile photo.
///
/// The first file part of the multipart body is taken as the photo. The
/// bytes are cached under a generated filename and the user's avatar_url is
/// pointed at it.
///
/// POST /upload/profile-photo
#[utoipa::path(
    post,
    path = "/upload/profile-photo",
    tag = "Upload",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Photo stored", body = UploadResponse),
        (status = 400, description = "Missing file, bad type or too large", body = crate::error::ErrorResponse)
    )
)]
#[post("/profile-photo")]
pub async fn upload_profile_photo(
    auth: AuthUser,
    mut payload: Multipart,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    cache: web::Data<AvatarCache>,
) -> AppResult<HttpResponse> {
    let max_size = config.max_upload_size;

    // Find the first file part
    let mut upload: Option<(String, String, Vec<u8>)> = None;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;

        let filename = match field.content_disposition().and_then(|cd| cd.get_filename()) {
            Some(name) => name.to_string(),
            None => continue,
        };

        let content_type = field
            .content_type()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_default();

        if !is_allowed_image(&content_type) {
            return Err(AppError::InvalidInput(
                "Invalid file type. Only JPEG, PNG and GIF are allowed.".to_string(),
            ));
        }

        // Stream the field, bailing out as soon as the size cap is passed
        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
            if bytes.len() + chunk.len() > max_size {
                return Err(AppError::InvalidInput(format!(
                    "File too large. Maximum size is {}MB.",
                    max_size / 1024 / 1024
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        upload = Some((filename, content_type, bytes));
        break;
    }

    let Some((original_name, content_type, bytes)) = upload else {
        return Err(AppError::InvalidInput("No file uploaded".to_string()));
    };

    let filename = format!(
        "{}-{}.{}",
        auth.id(),
        Utc::now().timestamp_millis(),
        file_extension(&original_name)
    );

    let size = bytes.len();
    cache.insert(filename.clone(), bytes, content_type);

    let avatar_url = format!("{}/upload/uploads/{}", config.backend_url, filename);
    users::update_avatar_url(pool.connection(), auth.user, &avatar_url).await?;

    info!("Stored avatar {} ({} bytes)", filename, size);

    Ok(HttpResponse::Ok().json(UploadResponse {
        success: true,
        avatar_url,
        message: "Profile photo uploaded successfully".to_string(),
    }))
}

/// Serve an uploaded avatar.
///
/// Public: avatar URLs are embedded in pages and fetched without credentials.
///
/// GET /upload/uploads/{filename}
#[utoipa::path(
    get,
    path = "/upload/uploads/{filename}",
    tag = "Upload",
    params(("filename" = String, Path, description = "Generated avatar filename")),
    responses(
        (status = 200, description = "Raw image bytes"),
        (status = 404, description = "Unknown or expired file", body = crate::error::ErrorResponse)
    )
)]
#[get("/uploads/{filename}")]
pub async fn serve_upload(
    path: web::Path<String>,
    cache: web::Data<AvatarCache>,
) -> AppResult<HttpResponse> {
    let filename = path.into_inner();

    let (bytes, content_type) = cache
        .fetch(&filename)
        .ok_or_else(|| AppError::NotFound("File not found or expired".to_string()))?;

    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header(("Cache-Control", AVATAR_CACHE_CONTROL))
        .body(bytes))
}

/// Configure upload routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(upload_profile_photo).service(serve_upload);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_allowlist() {
        assert!(is_allowed_image("image/png"));
        assert!(is_allowed_image("image/jpeg"));
        assert!(is_allowed_image("image/jpg"));
        assert!(is_allowed_image("image/gif"));
        assert!(is_allowed_image("IMAGE/PNG"));

        assert!(!is_allowed_image("image/webp"));
        assert!(!is_allowed_image("image/svg+xml"));
        assert!(!is_allowed_image("application/octet-stream"));
        assert!(!is_allowed_image("text/html"));
        assert!(!is_allowed_image(""));
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("photo.png"), "png");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension("noext"), "jpg");
        assert_eq!(file_extension("trailing."), "jpg");
        assert_eq!(file_extension("weird.a/b"), "jpg");
    }
}
