use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{FileStore, StoreError};

/// In-memory [`FileStore`] for tests. Clones share one tree.
///
/// Directories are implicit: a directory exists while any file lives
/// beneath it.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    files: BTreeMap<PathBuf, MemFile>,
    clock: u64,
    writes: usize,
    touches: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
struct MemFile {
    contents: String,
    modified: u64,
}

impl Inner {
    fn put(&mut self, path: &Path, contents: String) {
        self.clock += 1;
        self.writes += 1;
        let modified = self.clock;
        self.files.insert(path.to_path_buf(), MemFile { contents, modified });
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file without counting it as a write.
    pub fn seed(&self, path: impl AsRef<Path>, contents: &str) {
        let mut inner = self.inner.lock();
        inner.clock += 1;
        let modified = inner.clock;
        inner.files.insert(
            path.as_ref().to_path_buf(),
            MemFile {
                contents: contents.to_string(),
                modified,
            },
        );
    }

    /// Number of writes (including copies) since creation.
    pub fn writes(&self) -> usize {
        self.inner.lock().writes
    }

    /// Paths touched, in order.
    pub fn touches(&self) -> Vec<PathBuf> {
        self.inner.lock().touches.clone()
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.inner
            .lock()
            .files
            .get(path.as_ref())
            .map(|f| f.contents.clone())
    }

    pub fn modified(&self, path: impl AsRef<Path>) -> Option<u64> {
        self.inner.lock().files.get(path.as_ref()).map(|f| f.modified)
    }

    /// Every file beneath `root` with its contents, relative to `root`.
    pub fn snapshot(&self, root: impl AsRef<Path>) -> BTreeMap<PathBuf, String> {
        let root = root.as_ref();
        self.inner
            .lock()
            .files
            .iter()
            .filter_map(|(path, file)| {
                path.strip_prefix(root)
                    .ok()
                    .map(|rel| (rel.to_path_buf(), file.contents.clone()))
            })
            .collect()
    }

    fn files_under(&self, root: &Path) -> Vec<PathBuf> {
        self.inner
            .lock()
            .files
            .keys()
            .filter_map(|path| path.strip_prefix(root).ok().map(Path::to_path_buf))
            .filter(|rel| !rel.as_os_str().is_empty())
            .collect()
    }
}

impl FileStore for MemoryStore {
    async fn read(&self, path: &Path) -> Result<String, StoreError> {
        self.contents(path).ok_or_else(|| {
            StoreError::Read(path.to_path_buf(), io::Error::from(io::ErrorKind::NotFound))
        })
    }

    async fn write(&self, path: &Path, contents: &str) -> Result<(), StoreError> {
        self.inner.lock().put(path, contents.to_string());
        Ok(())
    }

    async fn exists(&self, path: &Path) -> bool {
        self.inner
            .lock()
            .files
            .keys()
            .any(|p| p.starts_with(path))
    }

    async fn copy_file(&self, source: &Path, destination: &Path) -> Result<(), StoreError> {
        let contents = self.contents(source).ok_or_else(|| {
            StoreError::Copy(
                source.to_path_buf(),
                destination.to_path_buf(),
                io::Error::from(io::ErrorKind::NotFound),
            )
        })?;
        self.inner.lock().put(destination, contents);
        Ok(())
    }

    async fn copy_folder(&self, source: &Path, destination: &Path) -> Result<usize, StoreError> {
        let files = self.files_under(source);
        if files.is_empty() {
            return Err(StoreError::List(
                source.to_path_buf(),
                io::Error::from(io::ErrorKind::NotFound),
            ));
        }
        for relative in &files {
            self.copy_file(&source.join(relative), &destination.join(relative))
                .await?;
        }
        Ok(files.len())
    }

    async fn remove(&self, path: &Path) -> Result<bool, StoreError> {
        Ok(self.inner.lock().files.remove(path).is_some())
    }

    async fn touch(&self, path: &Path) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.clock += 1;
        let now = inner.clock;
        inner.touches.push(path.to_path_buf());
        inner
            .files
            .entry(path.to_path_buf())
            .and_modify(|f| f.modified = now)
            .or_insert(MemFile {
                contents: String::new(),
                modified: now,
            });
        Ok(())
    }

    async fn list_files(&self, root: &Path, extension: &str) -> Result<Vec<PathBuf>, StoreError> {
        Ok(self
            .files_under(root)
            .into_iter()
            .filter(|p| p.extension().is_some_and(|ext| ext == extension))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_touch_bumps_modified_without_write() {
        let store = MemoryStore::new();
        store.seed("/p/index.html", "<html>");
        let before = store.modified("/p/index.html").unwrap();

        store.touch(Path::new("/p/index.html")).await.unwrap();

        assert!(store.modified("/p/index.html").unwrap() > before);
        assert_eq!(store.contents("/p/index.html").unwrap(), "<html>");
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_exists_for_implicit_directory() {
        let store = MemoryStore::new();
        store.seed("/p/src/Pages/Home_.elm", "");
        assert!(store.exists(Path::new("/p/src/Pages")).await);
        assert!(!store.exists(Path::new("/p/src/Layouts")).await);
    }
}
