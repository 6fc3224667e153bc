// src/models/user.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One record per email, last-write-wins. Created or refreshed when a
/// visitor completes the name step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Lower-cased email, the unique key.
    pub email: String,

    pub name: String,

    /// Derived: email equals the configured administrator email.
    pub is_admin: bool,

    /// Snapshot of the completed-users set; admin reads recompute it so it
    /// is never stale there.
    pub has_completed_quiz: bool,

    pub last_access: chrono::DateTime<chrono::Utc>,
}

/// DTO for requesting a verification code.
#[derive(Debug, Deserialize, Validate)]
pub struct RequestCodeRequest {
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
}

/// DTO for submitting a verification code.
#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

/// DTO for the name-entry step.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterNameRequest {
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(min = 2, max = 100, message = "Please enter your full name."))]
    pub name: String,
}
