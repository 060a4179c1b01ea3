use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::error::MediaError;
use super::key::MediaKey;
use super::traits::{MediaStore, extension_of, image_content_type};

/// Filesystem-backed image store.
///
/// Files are laid out as `{base_path}/{shard}/{rest of digest}.{ext}` and
/// written through a temp file + rename so readers never see partial data.
pub struct FilesystemMediaStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemMediaStore {
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, MediaError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    fn path_for(&self, key: &MediaKey) -> PathBuf {
        self.base_path.join(key.shard()).join(key.file_name())
    }

    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl MediaStore for FilesystemMediaStore {
    async fn save(&self, filename: &str, data: &[u8]) -> Result<MediaKey, MediaError> {
        image_content_type(filename)?;
        let extension = extension_of(filename)?;

        let size = data.len() as u64;
        if size > self.max_size {
            return Err(MediaError::SizeLimitExceeded {
                actual: size,
                limit: self.max_size,
            });
        }

        let key = MediaKey::for_content(data, &extension);
        let target = self.path_for(&key);
        if fs::try_exists(&target).await? {
            return Ok(key);
        }

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &target).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::debug!(key = %key, size, "Stored media file");
        Ok(key)
    }
}
