// src/verification.rs

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{CODE_TTL_MINUTES, MAX_CODE_ATTEMPTS};
use crate::store::{self, KeyValueStore};

/// One-time verification code tied to a single email.
/// Lives in the ephemeral scope only, keyed by `verification_{email}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationTicket {
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub attempts: u32,
}

/// What a verification attempt resolved to. `Expired`, `Exhausted` and
/// `NoTicket` mean the caller has to route the visitor back to the email
/// step; `Mismatch` leaves the ticket in place for a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified,
    Mismatch,
    Expired,
    Exhausted,
    NoTicket,
}

pub fn ticket_key(email: &str) -> String {
    format!("verification_{email}")
}

/// Uniform random 6-digit code. The range starts at 100000, so codes never
/// carry a leading zero.
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Issues, validates and retires verification tickets, and answers the
/// allow-list question. Holds the ephemeral store; tickets never touch disk.
pub struct VerificationEngine {
    tickets: Arc<dyn KeyValueStore>,
    allowed_emails: Vec<String>,
    admin_email: String,
}

impl VerificationEngine {
    pub fn new(
        tickets: Arc<dyn KeyValueStore>,
        allowed_emails: Vec<String>,
        admin_email: String,
    ) -> Self {
        Self {
            tickets,
            allowed_emails,
            admin_email,
        }
    }

    /// True iff the email is on the allow-list or is the administrator.
    /// Comparison is exact; inputs are normalized at the HTTP boundary.
    pub fn is_authorized(&self, email: &str) -> bool {
        self.allowed_emails.iter().any(|e| e == email) || email == self.admin_email
    }

    pub fn is_admin(&self, email: &str) -> bool {
        email == self.admin_email
    }

    /// Writes a fresh ticket for the email, replacing any prior one, and
    /// returns the code so the caller can hand it to the mailer or the UI.
    pub fn issue_code(&self, email: &str) -> String {
        let code = generate_code();
        let ticket = VerificationTicket {
            code: code.clone(),
            expires_at: Utc::now() + Duration::minutes(CODE_TTL_MINUTES),
            attempts: 0,
        };
        store::write_json(self.tickets.as_ref(), &ticket_key(email), &ticket);
        tracing::debug!("Issued verification code for {}", email);
        code
    }

    /// Checks a submitted code against the stored ticket.
    ///
    /// The attempt counter increments even when the guess is right; retiring
    /// the ticket after success is the session layer's transition
    /// postcondition, not done here.
    pub fn verify_code(&self, email: &str, submitted: &str) -> VerifyOutcome {
        let key = ticket_key(email);
        let Some(mut ticket) =
            store::read_json::<VerificationTicket>(self.tickets.as_ref(), &key)
        else {
            return VerifyOutcome::NoTicket;
        };

        if Utc::now() > ticket.expires_at {
            self.tickets.remove(&key);
            return VerifyOutcome::Expired;
        }

        if ticket.attempts >= MAX_CODE_ATTEMPTS {
            self.tickets.remove(&key);
            return VerifyOutcome::Exhausted;
        }

        ticket.attempts += 1;
        let matched = ticket.code == submitted;
        store::write_json(self.tickets.as_ref(), &key, &ticket);

        if matched {
            VerifyOutcome::Verified
        } else {
            VerifyOutcome::Mismatch
        }
    }

    pub fn discard_ticket(&self, email: &str) {
        self.tickets.remove(&ticket_key(email));
    }
}
