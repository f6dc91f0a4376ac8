use log::debug;

use super::responses::{ApiResponse, CredentialsRequest, SetupStatus};
use crate::modules::admin::CredentialStore;

pub const SETUP_CREATED_MESSAGE: &str = "Administrator created";
pub const LOGIN_OK_MESSAGE: &str = "Login successful";

/// `GET /setup`: always answers, failing open to `setupDone: false`
pub fn check_setup(store: &CredentialStore) -> ApiResponse {
    ApiResponse::ok(
        200,
        &SetupStatus {
            setup_done: store.is_setup_complete(),
        },
    )
}

/// `POST /setup`
pub fn create_admin(store: &CredentialStore, request: &CredentialsRequest) -> ApiResponse {
    let (username, password) = request.fields();
    match store.create_admin(username, password) {
        Ok(()) => ApiResponse::success(201, SETUP_CREATED_MESSAGE),
        Err(e) => e.into(),
    }
}

/// `POST /login`
pub fn login(store: &CredentialStore, request: &CredentialsRequest) -> ApiResponse {
    let (username, password) = request.fields();
    match store.verify_login(username, password) {
        Ok(()) => ApiResponse::success(200, LOGIN_OK_MESSAGE),
        Err(e) => e.into(),
    }
}

/// Parse a raw JSON body, answering 400 when it is not a credentials object
pub fn parse_credentials(body: &str) -> Result<CredentialsRequest, ApiResponse> {
    if body.trim().is_empty() {
        return Ok(CredentialsRequest::default());
    }
    serde_json::from_str(body).map_err(|e| {
        debug!("Rejecting malformed request body: {}", e);
        ApiResponse::error(400, "Malformed request body")
    })
}

/// `POST /setup` with a raw JSON body
pub fn create_admin_json(store: &CredentialStore, body: &str) -> ApiResponse {
    match parse_credentials(body) {
        Ok(request) => create_admin(store, &request),
        Err(response) => response,
    }
}

/// `POST /login` with a raw JSON body
pub fn login_json(store: &CredentialStore, body: &str) -> ApiResponse {
    match parse_credentials(body) {
        Ok(request) => login(store, &request),
        Err(response) => response,
    }
}
