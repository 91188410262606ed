//! On-disk blob storage.
//!
//! Files are written flat into one directory under collision-resistant
//! names: `{field}-{epoch_millis}-{random}{.ext}`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::debug;

use crate::error::Result;

/// URL prefix blobs are served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Upper bound (exclusive) for the random part of a stored name.
const SUFFIX_RANGE: u32 = 1_000_000_000;

/// Directory holding uploaded files.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Use `root` for blobs, creating it if needed.
    ///
    /// # Errors
    /// Returns `UploadError::Io` if the directory cannot be created.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Stored name for an upload: field name, upload time, a random number
    /// and the original extension.
    pub fn unique_name<R: Rng + ?Sized>(
        field: &str,
        original_name: &str,
        epoch_millis: i64,
        rng: &mut R,
    ) -> String {
        let suffix = rng.gen_range(0..SUFFIX_RANGE);
        let extension = Path::new(original_name)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        format!("{field}-{epoch_millis}-{suffix}{extension}")
    }

    /// Public path for a stored name.
    #[must_use]
    pub fn public_path(filename: &str) -> String {
        format!("{PUBLIC_PREFIX}/{filename}")
    }

    /// Write a blob.
    ///
    /// # Errors
    /// Returns `UploadError::Io` on write failure.
    pub async fn write(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path_of(filename);
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "Blob written");
        Ok(path)
    }

    /// Remove a blob. Returns `false` if it was already gone.
    ///
    /// # Errors
    /// Returns `UploadError::Io` on any failure other than a missing file.
    pub async fn remove(&self, filename: &str) -> Result<bool> {
        match tokio::fs::remove_file(self.path_of(filename)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Disk path for a stored name.
    #[must_use]
    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Blob directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}
