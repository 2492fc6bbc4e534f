//! Blob-store port for uploaded design files.

use std::fmt;

use async_trait::async_trait;

use crate::domain::registration::FileRef;

/// Storage key for an uploaded design file, scoped under the owning user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobKey(String);

impl BlobKey {
    /// Construct a key after validating that it is relative, trimmed, and
    /// free of parent-directory traversal.
    ///
    /// # Examples
    /// ```
    /// use derby_backend::domain::ports::BlobKey;
    ///
    /// let key = BlobKey::new("3fa85f64/1714067200000.pdf").expect("valid key");
    /// assert_eq!(key.as_str(), "3fa85f64/1714067200000.pdf");
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, BlobKeyValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(BlobKeyValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(BlobKeyValidationError::ContainsWhitespace);
        }
        if raw.starts_with('/') {
            return Err(BlobKeyValidationError::Absolute);
        }
        if raw.split('/').any(|segment| segment == "..") {
            return Err(BlobKeyValidationError::Traversal);
        }
        Ok(Self(raw))
    }

    /// Borrow the underlying key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for BlobKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validation errors returned when constructing [`BlobKey`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlobKeyValidationError {
    /// Key is empty after trimming whitespace.
    #[error("blob key must not be empty")]
    Empty,
    /// Key contains leading or trailing whitespace.
    #[error("blob key must not contain surrounding whitespace")]
    ContainsWhitespace,
    /// Key must be relative to the store root.
    #[error("blob key must not be absolute")]
    Absolute,
    /// Key must not escape the store root.
    #[error("blob key must not contain parent-directory segments")]
    Traversal,
}

/// Errors surfaced by blob-store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlobStoreError {
    /// The store is unreachable or timing out.
    #[error("blob store unavailable: {message}")]
    Unavailable { message: String },
    /// The store refused the write.
    #[error("blob store rejected the upload: {message}")]
    Rejected { message: String },
}

impl BlobStoreError {
    /// Helper for outages.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Helper for refused writes.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// Port for storing uploaded design files.
///
/// A successful `put` is durable before it returns: the registration row
/// persisted afterwards may safely reference the returned [`FileRef`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store the payload under the given key and return an opaque reference
    /// to the stored object.
    async fn put(
        &self,
        key: &BlobKey,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<FileRef, BlobStoreError>;
}

/// Fixture implementation that discards payloads and echoes the key.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBlobStore;

#[async_trait]
impl BlobStore for FixtureBlobStore {
    async fn put(
        &self,
        key: &BlobKey,
        _content_type: &str,
        _bytes: &[u8],
    ) -> Result<FileRef, BlobStoreError> {
        Ok(FileRef::new(key.as_str()))
    }
}
