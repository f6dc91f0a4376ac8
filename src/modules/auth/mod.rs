pub mod hashing;
pub mod password;

// Re-export the main types and functions
pub use hashing::{hash_password, verify_password, HASH_SCHEME, MIN_RECOMMENDED_ROUNDS};
pub use password::{read_password, validate_new_password, PasswordError};
