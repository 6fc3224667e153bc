// src/mailer.rs

//! Outbound email relay. The relay is a collaborator, not a dependency: any
//! failure here is logged and the verification code falls back to on-screen
//! display, so the gate is never blocked by delivery problems.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use url::Url;

#[derive(Debug)]
pub enum MailerError {
    NotConfigured,
    Request(String),
    Status(u16),
    Rejected,
}

impl fmt::Display for MailerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MailerError::NotConfigured => write!(f, "no email relay configured"),
            MailerError::Request(msg) => write!(f, "relay request failed: {}", msg),
            MailerError::Status(code) => write!(f, "relay responded with status {}", code),
            MailerError::Rejected => write!(f, "relay did not report success"),
        }
    }
}

impl std::error::Error for MailerError {}

#[async_trait]
pub trait VerificationMailer: Send + Sync {
    async fn send(&self, email: &str, code: &str) -> Result<(), MailerError>;
}

/// POSTs `{email, code}` to the configured relay endpoint. The request is
/// bounded by a timeout; a relay that hangs counts as a failed delivery.
pub struct RelayMailer {
    endpoint: Url,
    client: reqwest::Client,
}

impl RelayMailer {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, MailerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MailerError::Request(e.to_string()))?;
        Ok(Self { endpoint, client })
    }
}

#[async_trait]
impl VerificationMailer for RelayMailer {
    async fn send(&self, email: &str, code: &str) -> Result<(), MailerError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({ "email": email, "code": code }))
            .send()
            .await
            .map_err(|e| MailerError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MailerError::Status(response.status().as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| MailerError::Request(e.to_string()))?;

        if body.get("success").and_then(Value::as_bool) != Some(true) {
            return Err(MailerError::Rejected);
        }

        Ok(())
    }
}

/// Stand-in when no relay is configured; every send fails, which makes the
/// issue-code path expose the code to the caller.
pub struct NullMailer;

#[async_trait]
impl VerificationMailer for NullMailer {
    async fn send(&self, _email: &str, _code: &str) -> Result<(), MailerError> {
        Err(MailerError::NotConfigured)
    }
}
