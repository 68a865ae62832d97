//! File storage abstraction over the project tree.
//!
//! Every component reads and writes through [`FileStore`] so the watch
//! pipeline can run against the real filesystem ([`LocalStore`]) or an
//! in-memory tree in tests.

use std::path::{Path, PathBuf};

use thiserror::Error;

mod local;
#[cfg(test)]
mod memory;

pub use local::LocalStore;
#[cfg(test)]
pub use memory::MemoryStore;

/// File-level I/O failure, always carrying the offending path.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error when reading `{0}`")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("IO error when writing `{0}`")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("IO error when copying `{0}` to `{1}`")]
    Copy(PathBuf, PathBuf, #[source] std::io::Error),

    #[error("IO error when removing `{0}`")]
    Remove(PathBuf, #[source] std::io::Error),

    #[error("IO error when listing `{0}`")]
    List(PathBuf, #[source] std::io::Error),
}

/// Async file operations used by the regeneration and sync pipeline.
///
/// Writers create missing parent directories. Removing a missing file is
/// not an error. Listing a missing directory yields nothing.
#[allow(async_fn_in_trait)]
pub trait FileStore {
    async fn read(&self, path: &Path) -> Result<String, StoreError>;

    async fn write(&self, path: &Path, contents: &str) -> Result<(), StoreError>;

    async fn exists(&self, path: &Path) -> bool;

    async fn copy_file(&self, source: &Path, destination: &Path) -> Result<(), StoreError>;

    /// Merge-copy every file beneath `source` into `destination`.
    /// Returns the number of files copied.
    async fn copy_folder(&self, source: &Path, destination: &Path) -> Result<usize, StoreError>;

    /// Returns `false` if there was nothing to remove.
    async fn remove(&self, path: &Path) -> Result<bool, StoreError>;

    /// Bump the modification time, creating an empty file if missing.
    async fn touch(&self, path: &Path) -> Result<(), StoreError>;

    /// Files under `root` with the given extension, as sorted paths relative
    /// to `root`.
    async fn list_files(&self, root: &Path, extension: &str) -> Result<Vec<PathBuf>, StoreError>;

    /// Write only when the contents differ. Returns whether a write happened.
    async fn write_if_changed(&self, path: &Path, contents: &str) -> Result<bool, StoreError> {
        if let Ok(existing) = self.read(path).await
            && existing == contents
        {
            return Ok(false);
        }
        self.write(path, contents).await?;
        Ok(true)
    }

    /// Copy a text file only when the destination differs.
    async fn copy_if_changed(&self, source: &Path, destination: &Path) -> Result<bool, StoreError> {
        let contents = self.read(source).await?;
        self.write_if_changed(destination, &contents).await
    }
}
