//! Capability-scoped filesystem implementation of the blob-store port.
//!
//! The store holds a [`Dir`] handle opened once at startup; every write is
//! resolved relative to that handle, so a hostile key can never escape the
//! store root even if key validation were bypassed.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::fs::Dir;
use cap_std::ambient_authority;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{BlobKey, BlobStore, BlobStoreError};
use crate::domain::registration::FileRef;

/// Blob store backed by a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: Arc<Dir>,
}

impl FsBlobStore {
    /// Open the store rooted at `path`, creating the directory if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BlobStoreError> {
        let path = path.as_ref();
        Dir::create_ambient_dir_all(path, ambient_authority())
            .map_err(|err| BlobStoreError::unavailable(err.to_string()))?;
        let root = Dir::open_ambient_dir(path, ambient_authority())
            .map_err(|err| BlobStoreError::unavailable(err.to_string()))?;
        Ok(Self {
            root: Arc::new(root),
        })
    }
}

/// Stage the payload next to its destination, then rename over it.
///
/// The rename makes an overwrite atomic: a concurrent reader sees the old
/// file or the new one, never a partial write.
fn write_replacing(root: &Dir, relative: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = relative.parent()
        && !parent.as_os_str().is_empty()
    {
        root.create_dir_all(parent)?;
    }

    let staged = staging_path(relative);
    root.write(&staged, bytes)?;
    match root.remove_file(relative) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            let _cleanup = root.remove_file(&staged);
            return Err(err);
        }
    }
    root.rename(&staged, root, relative)
}

fn staging_path(relative: &Path) -> PathBuf {
    let staged_name = format!(".tmp-upload-{}", Uuid::new_v4().simple());
    match relative.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(staged_name),
        _ => PathBuf::from(staged_name),
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(
        &self,
        key: &BlobKey,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<FileRef, BlobStoreError> {
        let root = Arc::clone(&self.root);
        let relative = PathBuf::from(key.as_str());
        let payload = bytes.to_vec();
        debug!(key = %key, content_type, size = payload.len(), "storing design file");

        tokio::task::spawn_blocking(move || write_replacing(&root, &relative, &payload))
            .await
            .map_err(|err| BlobStoreError::unavailable(err.to_string()))?
            .map_err(|err| BlobStoreError::unavailable(err.to_string()))?;

        Ok(FileRef::new(key.as_str()))
    }
}
