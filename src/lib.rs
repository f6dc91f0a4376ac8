// First, declare the modules folder itself
mod modules;

// Re-export everything from modules for easier access
pub use modules::{admin, api, auth, config, error, storage, utils};

// Re-export commonly used types
pub use modules::admin::{CredentialStore, SetupState};
pub use modules::config::AppConfig;
pub use modules::error::{AuthError, StorageError};
pub use modules::storage::{AdminAccount, CredentialBackend, FileBackend, MemoryBackend};

// Constants
pub const DEFAULT_DATA_DIR: &str = "data";
pub const USERS_FILE: &str = "users.json";
pub const DEFAULT_HASH_ROUNDS: u32 = 100_000;
pub const MIN_PASSWORD_LENGTH: usize = 6;

// Type aliases
pub type HmacSha256 = hmac::Hmac<sha2::Sha256>;
