use std::io;

use thiserror::Error;

use crate::MIN_PASSWORD_LENGTH;

/// Reasons a new administrator password is rejected by the setup prompt
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password cannot be empty")]
    Empty,

    #[error("Password must be at least {} characters long", MIN_PASSWORD_LENGTH)]
    TooShort,

    #[error("Passwords don't match")]
    Mismatch,
}

/// Function to validate a new password and its confirmation
pub fn validate_new_password(password: &str, confirmation: &str) -> Result<(), PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::Empty);
    }
    if password != confirmation {
        return Err(PasswordError::Mismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    Ok(())
}

/// Helper function to read a password securely
pub fn read_password() -> io::Result<String> {
    rpassword::read_password()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_validation() {
        assert!(validate_new_password("secret1", "secret1").is_ok());

        assert_eq!(validate_new_password("", ""), Err(PasswordError::Empty));

        assert_eq!(
            validate_new_password("secret1", "secret2"),
            Err(PasswordError::Mismatch)
        );

        assert_eq!(
            validate_new_password("abc", "abc"),
            Err(PasswordError::TooShort)
        );

        // length counts characters, not bytes
        assert_eq!(
            validate_new_password("ñññññ", "ñññññ"),
            Err(PasswordError::TooShort)
        );
        assert!(validate_new_password("contraseña", "contraseña").is_ok());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PasswordError::TooShort.to_string(),
            "Password must be at least 6 characters long"
        );
        assert_eq!(PasswordError::Mismatch.to_string(), "Passwords don't match");
        assert_eq!(PasswordError::Empty.to_string(), "Password cannot be empty");

        // usable wherever a boxed error is expected
        let boxed: Box<dyn std::error::Error> = Box::new(PasswordError::Empty);
        assert!(boxed.source().is_none());
    }
}
