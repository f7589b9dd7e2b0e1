// src/services/image_storage.rs - write-once image files under one directory
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use thiserror::Error;
use uuid::Uuid;

static UNSAFE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid file name pattern"));

/// Only these uploads are kept; anything else is dropped as if no file was sent.
pub fn is_accepted_image(content_type: Option<&mime::Mime>) -> bool {
    match content_type {
        Some(m) => {
            m.type_() == mime::IMAGE
                && matches!(m.subtype().as_str(), "png" | "jpg" | "jpeg")
        }
        None => false,
    }
}

/// `<millis>-<8 hex>-<name>` with anything outside `[A-Za-z0-9._-]` collapsed to `_`.
pub fn unique_file_name(original_name: &str) -> String {
    let base = Path::new(original_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image");
    let cleaned = UNSAFE_NAME_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim_matches('.');
    let cleaned = if cleaned.is_empty() { "image" } else { cleaned };

    let tag = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", Utc::now().timestamp_millis(), &tag[..8], cleaned)
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("refusing to touch path outside image directory: {0}")]
    OutsideRoot(String),
}

#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Stores the bytes and returns the public path, e.g. `images/1700000-ab12cd34-cat.png`.
    async fn store(&self, original_name: &str, bytes: &[u8]) -> Result<String, StorageError>;

    async fn remove(&self, path: &str) -> Result<(), StorageError>;
}

/// Best-effort removal: failures are logged, never returned.
pub async fn clear_image(storage: &dyn ImageStorage, path: &str) {
    if path.is_empty() {
        return;
    }
    match storage.remove(path).await {
        Ok(()) => log::info!("removed image {}", path),
        Err(e) => log::warn!("failed to remove image {}: {}", path, e),
    }
}

pub struct DiskImageStorage {
    root: PathBuf,
    /// prefix used in the stored path, forward slashes only
    public_prefix: String,
}

impl DiskImageStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let public_prefix = root
            .to_string_lossy()
            .replace('\\', "/")
            .trim_start_matches("./")
            .trim_end_matches('/')
            .to_string();
        Self {
            root,
            public_prefix,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a stored path back onto the root, by file name only.
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let normalized = path.replace('\\', "/");
        let name = Path::new(&normalized)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StorageError::OutsideRoot(path.to_string()))?;

        let expected = format!("{}/{}", self.public_prefix, name);
        if normalized.trim_start_matches("./") != expected.trim_start_matches("./") {
            return Err(StorageError::OutsideRoot(path.to_string()));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl ImageStorage for DiskImageStorage {
    async fn store(&self, original_name: &str, bytes: &[u8]) -> Result<String, StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let file_name = unique_file_name(original_name);
        tokio::fs::write(self.root.join(&file_name), bytes).await?;
        Ok(format!("{}/{}", self.public_prefix, file_name))
    }

    async fn remove(&self, path: &str) -> Result<(), StorageError> {
        let file = self.resolve(path)?;
        tokio::fs::remove_file(file).await?;
        Ok(())
    }
}
