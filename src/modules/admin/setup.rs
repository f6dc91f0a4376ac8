use thiserror::Error;

use super::CredentialStore;
use crate::modules::auth::password::{read_password, validate_new_password};
use crate::modules::error::AuthError;
use crate::modules::utils::io::prompt;

/// Failures of the interactive flows
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Failed to read input: {0}")]
    Input(#[from] std::io::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Ask for a username unless one was passed on the command line
fn resolve_username(username: Option<&str>) -> std::io::Result<String> {
    match username {
        Some(name) if !name.trim().is_empty() => Ok(name.trim().to_string()),
        _ => prompt("Username: "),
    }
}

/// Prompt for the administrator credentials and create the account
pub fn run_interactive_setup(
    store: &CredentialStore,
    username: Option<&str>,
) -> Result<String, FlowError> {
    // Checked up front so nobody types a password for nothing
    if store.try_is_setup_complete()? {
        return Err(FlowError::Auth(AuthError::AlreadySetup));
    }

    println!("\n=== Initial Admin Setup ===");
    println!("Create the administrator account. This can only be done once.");

    let username = resolve_username(username)?;

    let password = loop {
        println!("\nEnter admin password:");
        let pwd = read_password()?;

        println!("Confirm password:");
        let confirm = read_password()?;

        match validate_new_password(&pwd, &confirm) {
            Ok(()) => break pwd,
            Err(e) => println!("{}. Please try again.", e),
        }
    };

    store.create_admin(&username, &password)?;
    Ok(username)
}

/// Prompt for a password and check it against the stored administrator
pub fn run_interactive_login(
    store: &CredentialStore,
    username: Option<&str>,
) -> Result<String, FlowError> {
    let username = resolve_username(username)?;

    println!("Password:");
    let password = read_password()?;

    store.verify_login(&username, &password)?;
    Ok(username)
}
