use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the credential store operations
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing username or password")]
    InvalidInput,

    #[error("The administrator has already been created")]
    AlreadySetup,

    /// Shared by unknown users and wrong passwords
    #[error("Invalid username or password")]
    Unauthorized,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// HTTP status code a transport layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidInput => 400,
            AuthError::AlreadySetup => 409,
            AuthError::Unauthorized => 401,
            AuthError::Storage(_) => 500,
        }
    }
}

/// Failures reading or writing the persisted credential mapping
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Corrupt credential data in {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Stored password hash is unusable: {0}")]
    InvalidHash(#[from] HashError),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors decoding an encoded password hash
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HashError {
    #[error("unsupported hash scheme `{0}`")]
    UnsupportedScheme(String),

    #[error("malformed hash encoding")]
    Malformed,

    #[error("invalid round count `{0}`")]
    InvalidRounds(String),
}

/// Errors building the runtime configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::InvalidInput.status_code(), 400);
        assert_eq!(AuthError::Unauthorized.status_code(), 401);
        assert_eq!(AuthError::AlreadySetup.status_code(), 409);

        let storage = StorageError::io(
            "data/users.json",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(AuthError::from(storage).status_code(), 500);
    }

    #[test]
    fn test_storage_error_mentions_path() {
        let err = StorageError::io(
            "data/users.json",
            io::Error::new(io::ErrorKind::Other, "disk full"),
        );
        let message = AuthError::from(err).to_string();
        assert!(message.contains("data/users.json"));
        assert!(message.contains("disk full"));
    }
}
