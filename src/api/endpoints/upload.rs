//! Avatar upload endpoint.
//!
//! `POST /api/upload/avatar` — multipart image, stored under the upload dir
//! keyed by user id + timestamp; the user row's avatar path is updated and
//! the file is served statically under `/uploads/`.

use axum::extract::{Multipart, State};
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::db;

/// Maximum avatar size in bytes (4 MB).
const MAX_AVATAR_BYTES: usize = 4 * 1024 * 1024;

const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

#[derive(Serialize)]
pub struct UploadResponse {
    pub avatar_path: String,
}

fn extension_for(content_type: Option<&str>, file_name: Option<&str>) -> Option<&'static str> {
    if let Some(ct) = content_type {
        match ct {
            "image/png" => return Some("png"),
            "image/jpeg" => return Some("jpg"),
            "image/webp" => return Some("webp"),
            _ => {}
        }
    }
    // Fall back to the filename's extension when the part has a generic type
    let name = file_name?;
    let guessed = mime_guess::from_path(name).first()?;
    match (guessed.type_().as_str(), guessed.subtype().as_str()) {
        ("image", "png") => Some("png"),
        ("image", "jpeg") => Some("jpg"),
        ("image", "webp") => Some("webp"),
        _ => None,
    }
}

/// `POST /api/upload/avatar` — store an avatar image for the caller.
pub async fn avatar(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
        .ok_or_else(|| ApiError::BadRequest("No file in upload".into()))?;

    let content_type = field.content_type().map(|s| s.to_string());
    let file_name = field.file_name().map(|s| s.to_string());
    let ext = extension_for(content_type.as_deref(), file_name.as_deref())
        .ok_or_else(|| ApiError::BadRequest("Avatar must be a PNG, JPEG, or WebP image".into()))?;
    debug_assert!(ALLOWED_EXTENSIONS.contains(&ext));

    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Upload read failed: {e}")))?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("Empty upload".into()));
    }
    if bytes.len() > MAX_AVATAR_BYTES {
        return Err(ApiError::BadRequest(format!(
            "Avatar exceeds 4 MB size limit ({} bytes)",
            bytes.len()
        )));
    }

    std::fs::create_dir_all(&ctx.config.upload_dir)
        .map_err(|e| ApiError::Internal(format!("Upload directory: {e}")))?;

    let file_name = format!(
        "{}_{}.{ext}",
        auth.user_id,
        chrono::Utc::now().timestamp_millis()
    );
    let path = ctx.config.upload_dir.join(&file_name);
    std::fs::write(&path, &bytes)
        .map_err(|e| ApiError::Internal(format!("Writing avatar: {e}")))?;

    let avatar_path = format!("/uploads/{file_name}");
    let conn = ctx.open_db()?;
    db::set_user_avatar(&conn, &auth.user_id, &avatar_path)?;

    tracing::info!(user_id = %auth.user_id, size = bytes.len(), "avatar stored");
    Ok(Json(UploadResponse { avatar_path }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_prefers_content_type() {
        assert_eq!(extension_for(Some("image/png"), Some("x.jpg")), Some("png"));
        assert_eq!(extension_for(Some("image/jpeg"), None), Some("jpg"));
    }

    #[test]
    fn extension_falls_back_to_filename() {
        assert_eq!(
            extension_for(Some("application/octet-stream"), Some("photo.webp")),
            Some("webp")
        );
        assert_eq!(extension_for(None, Some("avatar.jpeg")), Some("jpg"));
    }

    #[test]
    fn non_image_rejected() {
        assert_eq!(extension_for(Some("text/plain"), Some("notes.txt")), None);
        assert_eq!(extension_for(None, None), None);
    }
}
