use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::modules::error::AuthError;

/// Body of the create-admin and login requests. Missing fields are allowed
/// here and rejected by the store as invalid input.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl CredentialsRequest {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        }
    }

    pub(crate) fn fields(&self) -> (&str, &str) {
        (
            self.username.as_deref().unwrap_or_default(),
            self.password.as_deref().unwrap_or_default(),
        )
    }
}

#[derive(Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SetupStatus {
    pub setup_done: bool,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct SuccessBody {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub message: String,
    pub error: String,
}

/// Status code plus JSON body, ready for any HTTP layer to write out
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok<T: Serialize>(status: u16, body: &T) -> Self {
        let body = serde_json::to_value(body).unwrap_or_else(|_| json!({}));
        Self { status, body }
    }

    pub fn success(status: u16, message: &str) -> Self {
        Self::ok(
            status,
            &SuccessBody {
                success: true,
                message: message.to_string(),
            },
        )
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::ok(
            status,
            &ErrorBody {
                status_code: status,
                message: message.into(),
                error: reason_phrase(status).to_string(),
            },
        )
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<AuthError> for ApiResponse {
    fn from(error: AuthError) -> Self {
        let status = error.status_code();
        // storage details stay in the server log
        let message = match error {
            AuthError::Storage(_) => "Internal error while accessing credentials".to_string(),
            other => other.to_string(),
        };
        ApiResponse::error(status, message)
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        409 => "Conflict",
        500 => "Internal Server Error",
        _ => "Error",
    }
}
