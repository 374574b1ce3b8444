//! Image storage
//!
//! Stores uploaded catalog images on disk under a random name and hands the
//! stored filename back. No resizing or transcoding; files are served as
//! uploaded.

use std::path::{Path, PathBuf};

use crate::utils::{AppError, AppResult};

/// Extensions accepted for catalog images
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Open a store rooted at `dir`, creating it if needed
    pub fn new(dir: impl Into<PathBuf>) -> AppResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| AppError::internal(format!("Cannot create upload dir: {e}")))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist an uploaded file. The stored name is a random UUID with the
    /// original extension, so uploads can never collide or traverse paths.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> AppResult<String> {
        if bytes.is_empty() {
            return Err(AppError::validation("uploaded image is empty"));
        }

        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| AppError::validation("image file needs an extension"))?;
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AppError::validation(format!(
                "unsupported image type: .{extension}"
            )));
        }

        // sanity check the extension maps to an image mime type
        let mime = mime_guess::from_ext(&extension).first_or_octet_stream();
        if mime.type_() != mime_guess::mime::IMAGE {
            return Err(AppError::validation(format!(
                "unsupported image type: .{extension}"
            )));
        }

        let stored_name = format!("{}.{extension}", uuid::Uuid::new_v4());
        let path = self.dir.join(&stored_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::internal(format!("Cannot write image: {e}")))?;

        tracing::debug!(original = original_name, stored = %stored_name, "Image stored");
        Ok(stored_name)
    }
}
