use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use jwalk::WalkDir;

use super::{FileStore, StoreError};

/// [`FileStore`] backed by `tokio::fs`.
///
/// Directory walks run on the blocking pool since `jwalk` is synchronous.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl LocalStore {
    pub const fn new() -> Self {
        Self
    }
}

async fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent).await,
        _ => Ok(()),
    }
}

/// All files beneath `root`, relative to it, sorted.
async fn walk_files(root: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let owned = root.to_path_buf();
    let result = tokio::task::spawn_blocking(move || {
        let mut files: Vec<PathBuf> = WalkDir::new(&owned)
            .skip_hidden(false)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| e.path().strip_prefix(&owned).ok().map(Path::to_path_buf))
            .collect();
        files.sort();
        files
    })
    .await;

    result.map_err(|e| StoreError::List(root.to_path_buf(), io::Error::other(e)))
}

impl FileStore for LocalStore {
    async fn read(&self, path: &Path) -> Result<String, StoreError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::Read(path.to_path_buf(), e))
    }

    async fn write(&self, path: &Path, contents: &str) -> Result<(), StoreError> {
        let write = async {
            ensure_parent(path).await?;
            tokio::fs::write(path, contents).await
        };
        write.await.map_err(|e| StoreError::Write(path.to_path_buf(), e))
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn copy_file(&self, source: &Path, destination: &Path) -> Result<(), StoreError> {
        let copy = async {
            ensure_parent(destination).await?;
            tokio::fs::copy(source, destination).await
        };
        copy.await
            .map(|_| ())
            .map_err(|e| StoreError::Copy(source.to_path_buf(), destination.to_path_buf(), e))
    }

    async fn copy_folder(&self, source: &Path, destination: &Path) -> Result<usize, StoreError> {
        if !self.exists(source).await {
            return Err(StoreError::List(
                source.to_path_buf(),
                io::Error::from(io::ErrorKind::NotFound),
            ));
        }

        let files = walk_files(source).await?;
        for relative in &files {
            self.copy_file(&source.join(relative), &destination.join(relative))
                .await?;
        }
        Ok(files.len())
    }

    async fn remove(&self, path: &Path) -> Result<bool, StoreError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Remove(path.to_path_buf(), e)),
        }
    }

    async fn touch(&self, path: &Path) -> Result<(), StoreError> {
        let touch = async {
            ensure_parent(path).await?;
            let file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await?
                .into_std()
                .await;
            tokio::task::spawn_blocking(move || file.set_modified(SystemTime::now()))
                .await
                .map_err(io::Error::other)?
        };
        touch.await.map_err(|e| StoreError::Write(path.to_path_buf(), e))
    }

    async fn list_files(&self, root: &Path, extension: &str) -> Result<Vec<PathBuf>, StoreError> {
        if !self.exists(root).await {
            return Ok(Vec::new());
        }

        let files = walk_files(root).await?;
        Ok(files
            .into_iter()
            .filter(|p| p.extension().is_some_and(|ext| ext == extension))
            .collect())
    }
}
