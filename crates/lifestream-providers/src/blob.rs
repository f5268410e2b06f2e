//! Filesystem-backed blob store.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

use lifestream_domain::error::{Error, Result};
use lifestream_domain::ports::BlobStore;
use lifestream_domain::value_objects::{BlobInfo, PresignedUpload};

/// Object store rooted at a local directory.
///
/// Keys map to paths under the root; presigned URLs are `file://` URLs
/// with an expiry query parameter, honored by the upload tooling rather
/// than enforced server-side. Content hashes are SHA-256 over the object
/// bytes.
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    /// Returns an I/O error when the root cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| Error::io_with_source("failed to create blob root", e))?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.split('/').any(|part| part.is_empty() || part == "..") {
            return Err(Error::invalid_argument(format!("invalid blob key '{key}'")));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn presign_put(
        &self,
        key: &str,
        _content_type: &str,
        expires_in: Duration,
    ) -> Result<PresignedUpload> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io_with_source("failed to create blob prefix", e))?;
        }
        let expires_at = Utc::now()
            + chrono::Duration::from_std(expires_in)
                .map_err(|_| Error::invalid_argument("presign expiry out of range"))?;
        Ok(PresignedUpload {
            url: format!(
                "file://{}?expires={}",
                path.display(),
                expires_at.timestamp()
            ),
            expires_at,
        })
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io_with_source("failed to create blob prefix", e))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| Error::blob_with_source(format!("failed to write '{key}'"), e))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::not_found(format!("object '{key}'")))
            }
            Err(e) => Err(Error::blob_with_source(format!("failed to read '{key}'"), e)),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        Ok(tokio::fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn head(&self, key: &str) -> Result<BlobInfo> {
        let path = self.path_for(key)?;
        let mut file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::not_found(format!("object '{key}'")));
            }
            Err(e) => {
                return Err(Error::blob_with_source(format!("failed to open '{key}'"), e));
            }
        };

        // Stream the hash so multi-gigabyte uploads never sit in memory.
        let mut hasher = Sha256::new();
        let mut size = 0u64;
        let mut buf = vec![0u8; 64 * 1024];
        loop {
            let read = file
                .read(&mut buf)
                .await
                .map_err(|e| Error::blob_with_source(format!("failed to hash '{key}'"), e))?;
            if read == 0 {
                break;
            }
            hasher.update(&buf[..read]);
            size += read as u64;
        }
        Ok(BlobInfo {
            size,
            content_hash: hex::encode(hasher.finalize()),
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::blob_with_source(
                format!("failed to delete '{key}'"),
                e,
            )),
        }
    }

    fn provider_name(&self) -> &str {
        "local-fs"
    }
}

impl LocalBlobStore {
    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
