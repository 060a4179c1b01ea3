use async_trait::async_trait;

use super::error::MediaError;
use super::key::MediaKey;

/// Storage backend for images attached to blog posts.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist an upload and return its content-addressed key.
    ///
    /// `filename` is only used to derive the extension and content type.
    async fn save(&self, filename: &str, data: &[u8]) -> Result<MediaKey, MediaError>;
}

/// Guess the MIME type of an upload from its filename and require `image/*`.
pub fn image_content_type(filename: &str) -> Result<String, MediaError> {
    let mime = mime_guess::from_path(filename)
        .first()
        .ok_or_else(|| MediaError::UnsupportedType(filename.to_string()))?;
    if mime.type_() != mime_guess::mime::IMAGE {
        return Err(MediaError::UnsupportedType(mime.to_string()));
    }
    Ok(mime.to_string())
}

/// Lowercased extension of `filename`, without the dot.
pub fn extension_of(filename: &str) -> Result<String, MediaError> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| MediaError::UnsupportedType(filename.to_string()))
}
