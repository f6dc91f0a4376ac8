use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::modules::error::StorageError;

/// The single administrator credential pair
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminAccount {
    pub username: String,
    pub password_hash: String,
}

/// Persisted mapping of username to account, holding at most one entry
pub type AccountMap = BTreeMap<String, AdminAccount>;

/// Persistence behind the credential store.
///
/// A missing record must load as an empty map, never as an error.
/// `save` replaces the whole mapping and only returns once it is durable.
pub trait CredentialBackend: Send + Sync {
    fn load(&self) -> Result<AccountMap, StorageError>;

    fn save(&self, accounts: &AccountMap) -> Result<(), StorageError>;

    /// Write `next` only if the persisted mapping still equals `expected`.
    /// Returns `Ok(false)` without writing when it does not.
    fn compare_and_swap(
        &self,
        expected: &AccountMap,
        next: &AccountMap,
    ) -> Result<bool, StorageError>;
}
