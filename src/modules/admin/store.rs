use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use log::{debug, error, warn};

use crate::modules::auth::hashing::{derive_key, hash_password, hash_rounds, verify_password};
use crate::modules::error::{AuthError, StorageError};
use crate::modules::storage::{AccountMap, AdminAccount, CredentialBackend, FileBackend};
use crate::modules::utils::logging::log_credential_event;
use crate::DEFAULT_HASH_ROUNDS;

// Salt for the throwaway derivation done when the username is unknown
const DUMMY_SALT: [u8; 16] = [0u8; 16];

/// Setup state of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupState {
    Uninitialized,
    SetupComplete,
}

/// Owns the single administrator credential.
///
/// The store moves from [`SetupState::Uninitialized`] to
/// [`SetupState::SetupComplete`] exactly once, on the first successful
/// [`create_admin`](CredentialStore::create_admin). Share it between threads
/// with an `Arc`.
pub struct CredentialStore {
    backend: Arc<dyn CredentialBackend>,
    hash_rounds: u32,
    // held for the emptiness check plus the write in create_admin
    setup_lock: Mutex<()>,
}

impl CredentialStore {
    pub fn new(backend: Arc<dyn CredentialBackend>) -> Self {
        Self::with_rounds(backend, DEFAULT_HASH_ROUNDS)
    }

    pub fn with_rounds(backend: Arc<dyn CredentialBackend>, hash_rounds: u32) -> Self {
        Self {
            backend,
            hash_rounds: hash_rounds.max(1),
            setup_lock: Mutex::new(()),
        }
    }

    /// Store backed by a JSON file at `path`
    pub fn open(path: impl Into<PathBuf>, hash_rounds: u32) -> Self {
        Self::with_rounds(Arc::new(FileBackend::new(path)), hash_rounds)
    }

    /// Rounds used when hashing a new password
    pub fn hash_rounds(&self) -> u32 {
        self.hash_rounds
    }

    /// Cost of the throwaway derivation for an unknown username: the stored
    /// administrator's own rounds, so a miss costs what a wrong password does
    fn dummy_rounds(&self, accounts: &AccountMap) -> u32 {
        let mut stored = accounts.values();
        match (stored.next(), stored.next()) {
            (Some(account), None) => hash_rounds(&account.password_hash).unwrap_or_else(|e| {
                debug!("Stored hash unreadable ({}), using configured rounds", e);
                self.hash_rounds
            }),
            _ => self.hash_rounds,
        }
    }

    /// Whether the administrator exists. Unreadable state counts as "not set up".
    pub fn is_setup_complete(&self) -> bool {
        match self.try_is_setup_complete() {
            Ok(done) => done,
            Err(e) => {
                warn!("Treating unreadable credential store as not set up: {}", e);
                false
            }
        }
    }

    /// Like [`is_setup_complete`](Self::is_setup_complete) but surfaces storage errors
    pub fn try_is_setup_complete(&self) -> Result<bool, AuthError> {
        let accounts = self.backend.load()?;
        debug!("Setup check: {} account(s) stored", accounts.len());
        Ok(!accounts.is_empty())
    }

    pub fn state(&self) -> SetupState {
        if self.is_setup_complete() {
            SetupState::SetupComplete
        } else {
            SetupState::Uninitialized
        }
    }

    /// Create the one administrator account.
    ///
    /// Fails with `InvalidInput` on an empty username or password and with
    /// `AlreadySetup` once any account exists. Nothing is committed unless the
    /// backend write succeeds.
    pub fn create_admin(&self, username: &str, password: &str) -> Result<(), AuthError> {
        if username.is_empty() || password.is_empty() {
            log_credential_event("setup", username, false, Some("missing username or password"));
            return Err(AuthError::InvalidInput);
        }

        let _guard = self.setup_lock.lock().unwrap_or_else(|e| e.into_inner());

        let current = self.backend.load().map_err(|e| {
            error!("Refusing setup, credential store unreadable: {}", e);
            e
        })?;
        if !current.is_empty() {
            log_credential_event("setup", username, false, Some("administrator already exists"));
            return Err(AuthError::AlreadySetup);
        }

        let account = AdminAccount {
            username: username.to_string(),
            password_hash: hash_password(password, self.hash_rounds),
        };
        let mut next = current.clone();
        next.insert(account.username.clone(), account);

        match self.backend.compare_and_swap(&current, &next) {
            Ok(true) => {
                log_credential_event("setup", username, true, None);
                Ok(())
            }
            Ok(false) => {
                log_credential_event("setup", username, false, Some("store changed during setup"));
                Err(AuthError::AlreadySetup)
            }
            Err(e) => {
                error!("Failed to persist administrator: {}", e);
                Err(AuthError::Storage(e))
            }
        }
    }

    /// Check a login attempt. Unknown users and wrong passwords both fail with
    /// `Unauthorized`.
    pub fn verify_login(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let accounts = self.backend.load()?;

        let Some(account) = accounts.get(username) else {
            // keep the miss as expensive as a real check
            let _ = derive_key(password, &DUMMY_SALT, self.dummy_rounds(&accounts));
            log_credential_event("login", username, false, None);
            return Err(AuthError::Unauthorized);
        };

        match verify_password(password, &account.password_hash) {
            Ok(true) => {
                log_credential_event("login", username, true, None);
                Ok(())
            }
            Ok(false) => {
                log_credential_event("login", username, false, None);
                Err(AuthError::Unauthorized)
            }
            Err(e) => {
                error!("Stored password hash for login attempt is malformed: {}", e);
                Err(AuthError::Storage(StorageError::InvalidHash(e)))
            }
        }
    }
}
