// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir,
    Symlink(PathBuf),
}

/// In-memory filesystem.
///
/// Parent directories are created implicitly. Paths listed through
/// [`MockFileSystem::deny`] fail every mutation with `PermissionDenied`,
/// which is how a locked file in use by another process looks.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<BTreeMap<PathBuf, MockEntry>>>,
    denied: Arc<Mutex<BTreeSet<PathBuf>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref();
        let mut entries = self.lock();
        ensure_parents(&mut entries, path);
        entries.insert(path.to_path_buf(), MockEntry::File(content.into()));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut entries = self.lock();
        ensure_parents(&mut entries, path);
        entries.insert(path.to_path_buf(), MockEntry::Dir);
    }

    /// Make every mutation of `path` fail with `PermissionDenied`.
    pub fn deny(&self, path: impl AsRef<Path>) {
        self.denied
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.as_ref().to_path_buf());
    }

    /// Raw entry lookup, for assertions.
    pub fn entry(&self, path: impl AsRef<Path>) -> Option<MockEntry> {
        self.lock().get(path.as_ref()).cloned()
    }

    /// Contents of a file, following one level of symlink.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let entries = self.lock();
        match entries.get(path.as_ref())? {
            MockEntry::File(data) => Some(data.clone()),
            MockEntry::Symlink(target) => match entries.get(target)? {
                MockEntry::File(data) => Some(data.clone()),
                _ => None,
            },
            MockEntry::Dir => None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<PathBuf, MockEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_writable(&self, path: &Path) -> Result<()> {
        let denied = self.denied.lock().unwrap_or_else(|e| e.into_inner());
        if denied.contains(path) {
            return Err(anyhow::Error::new(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("access to the path {:?} is denied", path),
            )));
        }
        Ok(())
    }
}

fn ensure_parents(entries: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
    let mut parent = path.parent();
    while let Some(dir) = parent {
        if dir.as_os_str().is_empty() {
            break;
        }
        entries.entry(dir.to_path_buf()).or_insert(MockEntry::Dir);
        parent = dir.parent();
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let bytes = self
            .contents(path)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))?;
        String::from_utf8(bytes).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let bytes = self
            .contents(path)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))?;
        Ok(Box::new(Cursor::new(bytes)))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.check_writable(path)?;
        self.add_file(path, contents);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.lock().contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(
            self.lock().get(path),
            Some(MockEntry::File(_)) | Some(MockEntry::Symlink(_))
        )
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().get(path), Some(MockEntry::Dir))
    }

    fn is_symlink(&self, path: &Path) -> bool {
        matches!(self.lock().get(path), Some(MockEntry::Symlink(_)))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.add_dir(path);
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        self.check_writable(to)?;
        let bytes = self
            .contents(from)
            .ok_or_else(|| anyhow!("File not found: {:?}", from))?;
        self.add_file(to, bytes);
        Ok(())
    }

    fn symlink_file(&self, target: &Path, link: &Path) -> Result<()> {
        self.check_writable(link)?;
        let mut entries = self.lock();
        if entries.contains_key(link) {
            return Err(anyhow::Error::new(io::Error::from(io::ErrorKind::AlreadyExists)));
        }
        ensure_parents(&mut entries, link);
        entries.insert(link.to_path_buf(), MockEntry::Symlink(target.to_path_buf()));
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.check_writable(path)?;
        match self.lock().remove(path) {
            Some(_) => Ok(()),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.check_writable(path)?;
        self.lock().retain(|p, _| !p.starts_with(path));
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let entries = self.lock();
        if !matches!(entries.get(path), Some(MockEntry::Dir)) {
            return Err(anyhow!("Not a directory or not found: {:?}", path));
        }
        Ok(entries
            .keys()
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect())
    }
}
