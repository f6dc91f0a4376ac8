use std::sync::Mutex;

use super::backend::{AccountMap, CredentialBackend};
use crate::modules::error::StorageError;

/// In-process backend for tests and for embedders that persist elsewhere
#[derive(Default)]
pub struct MemoryBackend {
    accounts: Mutex<AccountMap>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(accounts: AccountMap) -> Self {
        Self {
            accounts: Mutex::new(accounts),
        }
    }

    /// Copy of the current mapping
    pub fn snapshot(&self) -> AccountMap {
        self.accounts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl CredentialBackend for MemoryBackend {
    fn load(&self) -> Result<AccountMap, StorageError> {
        Ok(self.snapshot())
    }

    fn save(&self, accounts: &AccountMap) -> Result<(), StorageError> {
        *self.accounts.lock().unwrap_or_else(|e| e.into_inner()) = accounts.clone();
        Ok(())
    }

    fn compare_and_swap(
        &self,
        expected: &AccountMap,
        next: &AccountMap,
    ) -> Result<bool, StorageError> {
        let mut current = self.accounts.lock().unwrap_or_else(|e| e.into_inner());
        if &*current != expected {
            return Ok(false);
        }
        *current = next.clone();
        Ok(true)
    }
}
