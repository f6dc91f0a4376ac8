use std::fs;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use admin_bootstrap::storage::AccountMap;
use admin_bootstrap::{
    AuthError, CredentialBackend, CredentialStore, FileBackend, MemoryBackend, StorageError,
};
use tempfile::TempDir;

const TEST_ROUNDS: u32 = 1_000;

// Helper to build a file-backed store inside a scratch directory
fn file_store(dir: &TempDir) -> CredentialStore {
    CredentialStore::open(dir.path().join("data").join("users.json"), TEST_ROUNDS)
}

/// Wraps a backend and sleeps between reading and writing, widening the
/// window in which concurrent setups could interleave
struct SlowBackend<B> {
    inner: B,
    delay: Duration,
}

impl<B: CredentialBackend> CredentialBackend for SlowBackend<B> {
    fn load(&self) -> Result<AccountMap, StorageError> {
        let accounts = self.inner.load()?;
        thread::sleep(self.delay);
        Ok(accounts)
    }

    fn save(&self, accounts: &AccountMap) -> Result<(), StorageError> {
        self.inner.save(accounts)
    }

    fn compare_and_swap(
        &self,
        expected: &AccountMap,
        next: &AccountMap,
    ) -> Result<bool, StorageError> {
        thread::sleep(self.delay);
        self.inner.compare_and_swap(expected, next)
    }
}

fn race_create_admin(store: Arc<CredentialStore>, contenders: usize) -> Vec<Result<(), AuthError>> {
    let barrier = Arc::new(Barrier::new(contenders));

    let handles: Vec<_> = (0..contenders)
        .map(|i| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.create_admin(&format!("admin{}", i), &format!("secret{}", i))
            })
        })
        .collect();

    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

#[test]
fn test_setup_survives_restart() {
    let dir = TempDir::new().unwrap();

    {
        let store = file_store(&dir);
        assert!(!store.is_setup_complete());
        store.create_admin("admin", "secret1").unwrap();
    }

    let reopened = file_store(&dir);
    assert!(reopened.is_setup_complete());
    assert!(reopened.verify_login("admin", "secret1").is_ok());
    assert!(matches!(
        reopened.verify_login("admin", "wrong"),
        Err(AuthError::Unauthorized)
    ));
    assert!(matches!(
        reopened.create_admin("second", "secret2"),
        Err(AuthError::AlreadySetup)
    ));
}

#[test]
fn test_first_access_initializes_store_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data").join("users.json");
    assert!(!path.exists());

    let store = file_store(&dir);
    assert!(!store.is_setup_complete());
    assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
}

#[test]
fn test_persisted_layout() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    store.create_admin("admin", "secret1").unwrap();

    let raw = fs::read_to_string(dir.path().join("data").join("users.json")).unwrap();
    assert!(!raw.contains("secret1"));

    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entries = value.as_object().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(value["admin"]["username"], "admin");
    assert!(value["admin"]["passwordHash"]
        .as_str()
        .unwrap()
        .starts_with("pbkdf2-sha256$"));
}

#[test]
fn test_corrupt_file_blocks_setup_but_reports_not_done() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data").join("users.json");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{\"admin\": {\"username\": ").unwrap();

    let store = file_store(&dir);
    assert!(!store.is_setup_complete());
    assert!(matches!(
        store.try_is_setup_complete(),
        Err(AuthError::Storage(StorageError::Corrupt { .. }))
    ));
    assert!(matches!(
        store.create_admin("admin", "secret1"),
        Err(AuthError::Storage(_))
    ));

    // the damaged file is left for an operator to inspect
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "{\"admin\": {\"username\": "
    );
}

#[test]
fn test_concurrent_setup_on_file_store() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(file_store(&dir));

    let results = race_create_admin(Arc::clone(&store), 8);

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(AuthError::AlreadySetup)))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(conflicts, 7);

    let reopened = file_store(&dir);
    assert!(reopened.is_setup_complete());
}

#[test]
fn test_concurrent_setup_with_slow_backend() {
    let backend = Arc::new(SlowBackend {
        inner: MemoryBackend::new(),
        delay: Duration::from_millis(20),
    });
    let store = Arc::new(CredentialStore::with_rounds(backend.clone(), TEST_ROUNDS));

    let results = race_create_admin(store, 6);

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(AuthError::AlreadySetup)))
            .count(),
        5
    );
    assert_eq!(backend.inner.snapshot().len(), 1);
}

#[test]
fn test_separate_stores_race_through_compare_and_swap() {
    // Each store has its own setup lock, so only the backend swap arbitrates
    let backend = Arc::new(SlowBackend {
        inner: MemoryBackend::new(),
        delay: Duration::from_millis(20),
    });
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = ["first", "second"]
        .into_iter()
        .map(|name| {
            let store = CredentialStore::with_rounds(backend.clone(), TEST_ROUNDS);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.create_admin(name, "secret1")
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(AuthError::AlreadySetup))));
    assert_eq!(backend.inner.snapshot().len(), 1);
}

#[test]
fn test_two_file_stores_share_state() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(FileBackend::new(dir.path().join("users.json")));
    let first = CredentialStore::with_rounds(backend.clone(), TEST_ROUNDS);
    let second = CredentialStore::with_rounds(backend.clone(), TEST_ROUNDS);

    first.create_admin("admin", "secret1").unwrap();
    assert!(matches!(
        second.create_admin("admin2", "secret2"),
        Err(AuthError::AlreadySetup)
    ));
    assert!(second.verify_login("admin", "secret1").is_ok());
    assert!(backend.path().exists());
}

#[test]
fn test_separately_opened_file_stores_create_one_admin() {
    // Two independent opens share nothing but the path, as two processes would
    for _ in 0..50 {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("users.json");
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = ["first", "second"]
            .into_iter()
            .map(|name| {
                let store = CredentialStore::open(&path, TEST_ROUNDS);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    (name, store.create_admin(name, "secret1"))
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let winners: Vec<_> = results
            .iter()
            .filter(|(_, result)| result.is_ok())
            .map(|(name, _)| *name)
            .collect();
        assert_eq!(winners.len(), 1);
        assert!(results
            .iter()
            .any(|(_, result)| matches!(result, Err(AuthError::AlreadySetup))));

        // the reported winner is the admin that actually persisted
        let reopened = CredentialStore::open(&path, TEST_ROUNDS);
        assert!(reopened.verify_login(winners[0], "secret1").is_ok());
    }
}
