use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use omnistream_core::{Account, Platform};
use tempfile::NamedTempFile;

use super::{AccountStore, StoreError};

/// Accounts kept as a JSON array in a single file.
///
/// Every write replaces the file atomically through a temp file in the same
/// directory, so a crash never leaves a half-written account list.
#[derive(Debug)]
pub struct FileAccountStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileAccountStore {
    pub const DEFAULT_FILE_NAME: &'static str = "accounts.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at `{dir}/accounts.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(Self::DEFAULT_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<Account>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, accounts: &[Account]) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let json = serde_json::to_string_pretty(accounts)?;
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }

    fn modify<T>(&self, f: impl FnOnce(&mut Vec<Account>) -> T) -> Result<T, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut accounts = self.read_all()?;
        let result = f(&mut accounts);
        accounts.sort_by_key(|account| account.platform);
        self.write_all(&accounts)?;
        Ok(result)
    }
}

impl AccountStore for FileAccountStore {
    fn get(&self, platform: Platform) -> Result<Option<Account>, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(self
            .read_all()?
            .into_iter()
            .find(|account| account.platform == platform))
    }

    fn put(&self, account: Account) -> Result<(), StoreError> {
        self.modify(|accounts| {
            accounts.retain(|existing| existing.platform != account.platform);
            accounts.push(account);
        })
    }

    fn delete(&self, platform: Platform) -> Result<bool, StoreError> {
        self.modify(|accounts| {
            let before = accounts.len();
            accounts.retain(|existing| existing.platform != platform);
            accounts.len() != before
        })
    }

    fn list(&self) -> Result<Vec<Account>, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        self.read_all()
    }
}
