pub mod handlers;
pub mod responses;

pub use handlers::{check_setup, create_admin, create_admin_json, login, login_json};
pub use responses::{ApiResponse, CredentialsRequest, ErrorBody, SetupStatus, SuccessBody};
