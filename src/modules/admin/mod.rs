mod setup;
mod store;

pub use setup::{run_interactive_login, run_interactive_setup, FlowError};
pub use store::{CredentialStore, SetupState};
