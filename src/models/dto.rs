use serde::{Deserialize, Serialize};
use validator::Validate;

/// Raw login/registration body; fields are optional so a missing one is a 400, not a rejection.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Validate)]
pub struct Registration {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RegisteredUser {
    pub username: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub username: String,
    pub token: String,
    pub expires_in_hours: i64,
}

#[derive(Serialize, Debug)]
pub struct ApiInfo {
    pub status: &'static str,
    pub message: &'static str,
    pub version: &'static str,
    pub authentication: &'static str,
}

#[derive(Serialize, Debug)]
pub struct RefreshReport {
    pub total_logs: usize,
    pub skipped_lines: usize,
}
