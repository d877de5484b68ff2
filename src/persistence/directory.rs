//! Directory abstraction for persistence.
//!
//! A trait-based abstraction over storage backends so the index builder and
//! reader don't hardcode the filesystem: `FsDirectory` for real builds,
//! `MemoryDirectory` for tests and ephemeral indexes.

use std::io::{Read, Write};
use std::path::PathBuf;

use crate::error::{IndexError, IndexResult};

/// Trait for directory-like storage backends.
pub trait Directory: Send + Sync {
    /// Creates a new file for writing, overwriting any existing file at `path`.
    fn create_file(&self, path: &str) -> IndexResult<Box<dyn Write>>;

    /// Opens an existing file for reading.
    fn open_file(&self, path: &str) -> IndexResult<Box<dyn Read>>;

    /// Checks whether a file or directory exists.
    fn exists(&self, path: &str) -> bool;

    /// Deletes a file, or recursively deletes a directory.
    fn delete(&self, path: &str) -> IndexResult<()>;

    /// Atomically renames/moves a file.
    fn atomic_rename(&self, from: &str, to: &str) -> IndexResult<()>;

    /// Creates a directory, including parent directories.
    fn create_dir_all(&self, path: &str) -> IndexResult<()>;

    /// Lists entries in a directory, relative to the directory root.
    fn list_dir(&self, path: &str) -> IndexResult<Vec<String>>;

    /// Returns the file path for memory mapping, or `None` if the backend
    /// doesn't support it (e.g. `MemoryDirectory`).
    fn file_path(&self, path: &str) -> Option<PathBuf>;
}

/// Filesystem-based directory implementation, rooted under a single directory.
pub struct FsDirectory {
    root: PathBuf,
}

impl FsDirectory {
    pub fn new<P: Into<PathBuf>>(root: P) -> IndexResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| IndexError::io(root.clone(), e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl Directory for FsDirectory {
    fn create_file(&self, path: &str) -> IndexResult<Box<dyn Write>> {
        let full_path = self.resolve_path(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| IndexError::io(parent.to_path_buf(), e))?;
        }
        let file = std::fs::File::create(&full_path).map_err(|e| IndexError::io(full_path, e))?;
        Ok(Box::new(file))
    }

    fn open_file(&self, path: &str) -> IndexResult<Box<dyn Read>> {
        let full_path = self.resolve_path(path);
        let file = std::fs::File::open(&full_path).map_err(|e| IndexError::io(full_path, e))?;
        Ok(Box::new(file))
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve_path(path).exists()
    }

    fn delete(&self, path: &str) -> IndexResult<()> {
        let full_path = self.resolve_path(path);
        let result = if full_path.is_dir() { std::fs::remove_dir_all(&full_path) } else { std::fs::remove_file(&full_path) };
        result.map_err(|e| IndexError::io(full_path, e))
    }

    fn atomic_rename(&self, from: &str, to: &str) -> IndexResult<()> {
        let from_path = self.resolve_path(from);
        let to_path = self.resolve_path(to);
        if let Some(parent) = to_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| IndexError::io(parent.to_path_buf(), e))?;
        }
        std::fs::rename(&from_path, &to_path).map_err(|e| IndexError::io(to_path, e))
    }

    fn create_dir_all(&self, path: &str) -> IndexResult<()> {
        let full_path = self.resolve_path(path);
        std::fs::create_dir_all(&full_path).map_err(|e| IndexError::io(full_path, e))
    }

    fn list_dir(&self, path: &str) -> IndexResult<Vec<String>> {
        let full_path = self.resolve_path(path);
        let entries = std::fs::read_dir(&full_path).map_err(|e| IndexError::io(full_path.clone(), e))?;
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| IndexError::io(full_path.clone(), e))?;
            paths.push(entry.file_name().to_string_lossy().to_string());
        }
        Ok(paths)
    }

    fn file_path(&self, path: &str) -> Option<PathBuf> {
        Some(self.resolve_path(path))
    }
}

/// In-memory directory implementation, for tests and ephemeral indexes.
#[derive(Clone, Default)]
pub struct MemoryDirectory {
    files: std::sync::Arc<std::sync::RwLock<std::collections::HashMap<String, Vec<u8>>>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Directory for MemoryDirectory {
    fn create_file(&self, path: &str) -> IndexResult<Box<dyn Write>> {
        Ok(Box::new(MemoryWriter { files: self.files.clone(), path: path.to_string(), buffer: Vec::new() }))
    }

    fn open_file(&self, path: &str) -> IndexResult<Box<dyn Read>> {
        let files = self.files.read().unwrap();
        let data = files
            .get(path)
            .cloned()
            .ok_or_else(|| IndexError::io(PathBuf::from(path), std::io::Error::new(std::io::ErrorKind::NotFound, "not found in memory directory")))?;
        Ok(Box::new(std::io::Cursor::new(data)))
    }

    fn exists(&self, path: &str) -> bool {
        self.files.read().unwrap().contains_key(path)
    }

    fn delete(&self, path: &str) -> IndexResult<()> {
        self.files.write().unwrap().remove(path);
        Ok(())
    }

    fn atomic_rename(&self, from: &str, to: &str) -> IndexResult<()> {
        let mut files = self.files.write().unwrap();
        if let Some(data) = files.remove(from) {
            files.insert(to.to_string(), data);
        }
        Ok(())
    }

    fn create_dir_all(&self, _path: &str) -> IndexResult<()> {
        Ok(())
    }

    fn list_dir(&self, path: &str) -> IndexResult<Vec<String>> {
        let files = self.files.read().unwrap();
        let prefix = if path.is_empty() { String::new() } else { format!("{path}/") };
        let mut result: Vec<String> = files.keys().filter(|k| k.starts_with(&prefix)).map(|k| k.strip_prefix(&prefix).unwrap_or(k).to_string()).collect();
        result.sort();
        Ok(result)
    }

    fn file_path(&self, _path: &str) -> Option<PathBuf> {
        None
    }
}

struct MemoryWriter {
    files: std::sync::Arc<std::sync::RwLock<std::collections::HashMap<String, Vec<u8>>>>,
    path: String,
    buffer: Vec<u8>,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut files = self.files.write().unwrap();
        files.insert(self.path.clone(), self.buffer.clone());
        Ok(())
    }
}

impl Drop for MemoryWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_directory_round_trip() {
        let temp_dir = std::env::temp_dir().join(format!("rank_wand_test_{}", std::process::id()));
        let dir = FsDirectory::new(&temp_dir).unwrap();

        let mut file = dir.create_file("test.txt").unwrap();
        file.write_all(b"hello").unwrap();
        drop(file);

        let mut file = dir.open_file("test.txt").unwrap();
        let mut contents = String::new();
        file.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "hello");

        assert!(dir.exists("test.txt"));
        dir.atomic_rename("test.txt", "renamed.txt").unwrap();
        assert!(!dir.exists("test.txt"));
        assert!(dir.exists("renamed.txt"));

        dir.delete("renamed.txt").unwrap();
        assert!(!dir.exists("renamed.txt"));

        std::fs::remove_dir_all(&temp_dir).ok();
    }

    #[test]
    fn memory_directory_round_trip() {
        let dir = MemoryDirectory::new();

        let mut file = dir.create_file("test.txt").unwrap();
        file.write_all(b"hello").unwrap();
        file.flush().unwrap();

        let mut file = dir.open_file("test.txt").unwrap();
        let mut contents = String::new();
        file.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "hello");

        assert!(dir.exists("test.txt"));
        dir.atomic_rename("test.txt", "renamed.txt").unwrap();
        assert!(!dir.exists("test.txt"));
        assert!(dir.exists("renamed.txt"));

        dir.delete("renamed.txt").unwrap();
        assert!(!dir.exists("renamed.txt"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = MemoryDirectory::new();
        assert!(dir.open_file("missing.txt").is_err());
    }
}
