//! File I/O utilities with atomic writes
//!
//! The store file is only ever replaced whole, through a temp file and a
//! rename, so a reader sees either the previous commit or the next one.
//! Writers serialize on an advisory lock held across read-check-write.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;
use tracing::{trace, warn};

use crate::error::AuditError;

/// Read JSON from a file, returning a default value if file doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, AuditError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        trace!(path = %path.display(), "file missing, using defaults");
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| AuditError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map_err(|e| AuditError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Exclusive lock on a store file, released when dropped
///
/// The lock lives on a `<file>.lock` sidecar rather than the store file,
/// which is replaced by rename on every write.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %e, "failed to release lock");
        }
    }
}

/// Block until this process holds the exclusive lock for `path`
pub fn lock_exclusive<P: AsRef<Path>>(path: P) -> Result<FileLock, AuditError> {
    let path = path.as_ref();
    create_parent_dir(path)?;

    let mut lock_name = path.as_os_str().to_owned();
    lock_name.push(".lock");
    let lock_path = PathBuf::from(lock_name);

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|e| {
            AuditError::Storage(format!("Failed to open {}: {}", lock_path.display(), e))
        })?;

    FileExt::lock_exclusive(&file).map_err(|e| {
        AuditError::Storage(format!("Failed to lock {}: {}", lock_path.display(), e))
    })?;

    trace!(path = %lock_path.display(), "acquired lock");
    Ok(FileLock {
        file,
        path: lock_path,
    })
}

/// Write JSON to a file atomically (write to temp, then rename)
///
/// The target is either completely replaced or not modified at all. Each
/// call writes through its own uniquely named temp file.
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), AuditError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let dir = create_parent_dir(path)?;

    // Same directory as the target so the rename stays on one filesystem
    let mut temp = NamedTempFile::new_in(dir)
        .map_err(|e| AuditError::Storage(format!("Failed to create temp file: {}", e)))?;

    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, data)
            .map_err(|e| AuditError::Storage(format!("Failed to serialize data: {}", e)))?;
        writer
            .flush()
            .map_err(|e| AuditError::Storage(format!("Failed to flush data: {}", e)))?;
    }

    temp.as_file()
        .sync_all()
        .map_err(|e| AuditError::Storage(format!("Failed to sync data: {}", e)))?;

    // On failure the temp file is removed when `temp` drops
    temp.persist(path)
        .map_err(|e| AuditError::Storage(format!("Failed to rename temp file: {}", e.error)))?;

    trace!(path = %path.display(), "wrote file atomically");
    Ok(())
}

/// Create the directory holding `path` and return it
fn create_parent_dir(path: &Path) -> Result<&Path, AuditError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => return Ok(Path::new(".")),
    };

    fs::create_dir_all(parent).map_err(|e| {
        AuditError::Storage(format!(
            "Failed to create directory {}: {}",
            parent.display(),
            e
        ))
    })?;
    Ok(parent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct Shelf {
        label: String,
        capacity: i32,
    }

    #[test]
    fn test_read_nonexistent_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.json");

        let data: Shelf = read_json(&path).unwrap();
        assert_eq!(data, Shelf::default());
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("shelf.json");

        let data = Shelf {
            label: "A1".to_string(),
            capacity: 40,
        };

        write_json_atomic(&path, &data).unwrap();
        let loaded: Shelf = read_json(&path).unwrap();
        assert_eq!(data, loaded);
    }

    #[test]
    fn test_atomic_write_no_temp_file_left() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("shelf.json");

        write_json_atomic(&path, &Shelf::default()).unwrap();
        write_json_atomic(&path, &Shelf::default()).unwrap();

        let entries: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("shelf.json")]);
    }

    #[test]
    fn test_lock_uses_sidecar_and_is_reacquirable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("shelf.json");

        let lock = lock_exclusive(&path).unwrap();
        assert_eq!(lock.path(), temp_dir.path().join("shelf.json.lock"));
        write_json_atomic(&path, &Shelf::default()).unwrap();
        drop(lock);

        // Released on drop, so a second holder does not block
        let again = lock_exclusive(&path).unwrap();
        assert!(again.path().exists());
    }

    #[test]
    fn test_lock_excludes_other_holders() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;
        use std::thread;
        use std::time::Duration;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("shelf.json");
        let released = Arc::new(AtomicBool::new(false));

        let lock = lock_exclusive(&path).unwrap();
        let waiter = {
            let path = path.clone();
            let released = Arc::clone(&released);
            thread::spawn(move || {
                let _lock = lock_exclusive(&path).unwrap();
                released.load(Ordering::SeqCst)
            })
        };

        thread::sleep(Duration::from_millis(100));
        released.store(true, Ordering::SeqCst);
        drop(lock);

        assert!(waiter.join().unwrap(), "second holder got the lock early");
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("data").join("store.json");

        write_json_atomic(&path, &Shelf::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_corrupt_file_is_a_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("shelf.json");
        fs::write(&path, "not json at all").unwrap();

        let err = read_json::<Shelf, _>(&path).unwrap_err();
        assert!(matches!(err, AuditError::Storage(_)));
    }
}
