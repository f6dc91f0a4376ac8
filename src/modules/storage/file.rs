use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use log::{debug, info, warn};
use tempfile::NamedTempFile;

use super::backend::{AccountMap, CredentialBackend};
use crate::modules::error::StorageError;

/// JSON file holding the credential mapping.
///
/// Writers take an exclusive lock on a sidecar `<file>.lock` next to the
/// mapping, so every backend opened on the same path (in this process or
/// another one) commits one at a time.
pub struct FileBackend {
    path: PathBuf,
    lock_path: PathBuf,
}

/// Held exclusive lock on the sidecar file, released on drop
struct WriteLock {
    file: File,
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            warn!("Failed to release credential store lock: {}", e);
        }
    }
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_name = path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("credentials"));
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);
        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Block until this process owns the sidecar lock
    fn lock_for_write(&self) -> Result<WriteLock, StorageError> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&self.lock_path)
            .map_err(|e| StorageError::io(&self.lock_path, e))?;
        file.lock_exclusive()
            .map_err(|e| StorageError::io(&self.lock_path, e))?;
        Ok(WriteLock { file })
    }

    /// Create the file as `{}` so later reads find a valid empty mapping.
    /// An existing file, even one that appeared since the caller looked, is
    /// left as it is.
    fn initialize_empty(&self) -> Result<(), StorageError> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!("Credential store {} already exists", self.path.display());
                return Ok(());
            }
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };
        file.write_all(b"{}")
            .map_err(|e| StorageError::io(&self.path, e))?;
        info!("Initialized empty credential store at {}", self.path.display());
        Ok(())
    }

    fn write_atomically(&self, accounts: &AccountMap) -> Result<(), StorageError> {
        let data = serde_json::to_string_pretty(accounts).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            source: e,
        })?;

        let dir = self.parent_dir();
        fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;

        // Write next to the target and rename over it so readers never see a partial file
        let mut temp = NamedTempFile::new_in(dir).map_err(|e| StorageError::io(dir, e))?;
        temp.write_all(data.as_bytes())
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| StorageError::io(temp.path(), e))?;
        temp.persist(&self.path)
            .map_err(|e| StorageError::io(&self.path, e.error))?;

        debug!(
            "Saved {} account(s) to {}",
            accounts.len(),
            self.path.display()
        );
        Ok(())
    }
}

impl CredentialBackend for FileBackend {
    fn load(&self) -> Result<AccountMap, StorageError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                // Absence is an empty store; creating the file is best effort
                if let Err(init_err) = self.initialize_empty() {
                    warn!("Could not initialize credential store: {}", init_err);
                }
                return Ok(AccountMap::new());
            }
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        if data.trim().is_empty() {
            return Ok(AccountMap::new());
        }

        serde_json::from_str(&data).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            source: e,
        })
    }

    fn save(&self, accounts: &AccountMap) -> Result<(), StorageError> {
        let _lock = self.lock_for_write()?;
        self.write_atomically(accounts)
    }

    fn compare_and_swap(
        &self,
        expected: &AccountMap,
        next: &AccountMap,
    ) -> Result<bool, StorageError> {
        // held across load, compare and rename
        let _lock = self.lock_for_write()?;

        let current = self.load()?;
        if &current != expected {
            return Ok(false);
        }

        self.write_atomically(next)?;
        Ok(true)
    }
}
