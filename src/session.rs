// src/session.rs

//! The visitor-facing verification flow: email → code → name → complete.
//! The current step is tracked per email in the ephemeral scope, so a
//! restart of the process sends everyone back to the email step.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::MIN_NAME_LENGTH;
use crate::error::AppError;
use crate::models::user::UserIdentity;
use crate::results;
use crate::store::{self, KeyValueStore, USERS_KEY};
use crate::verification::{VerificationEngine, VerifyOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStep {
    #[default]
    Email,
    Code,
    Name,
    Complete,
}

/// Result of a code entry, pre-routed for the caller: `Restart` carries the
/// reason the visitor is being sent back to the email step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeAttempt {
    Accepted,
    Rejected,
    Restart(VerifyOutcome),
}

pub fn session_key(email: &str) -> String {
    format!("session_{email}")
}

/// All stored user identities.
pub fn users(store: &dyn KeyValueStore) -> Vec<UserIdentity> {
    store::read_json(store, USERS_KEY).unwrap_or_default()
}

pub fn find_user(store: &dyn KeyValueStore, email: &str) -> Option<UserIdentity> {
    users(store).into_iter().find(|u| u.email == email)
}

pub struct SessionFlow {
    durable: Arc<dyn KeyValueStore>,
    ephemeral: Arc<dyn KeyValueStore>,
    engine: VerificationEngine,
}

impl SessionFlow {
    pub fn new(
        durable: Arc<dyn KeyValueStore>,
        ephemeral: Arc<dyn KeyValueStore>,
        engine: VerificationEngine,
    ) -> Self {
        Self {
            durable,
            ephemeral,
            engine,
        }
    }

    pub fn step(&self, email: &str) -> VerificationStep {
        store::read_json(self.ephemeral.as_ref(), &session_key(email)).unwrap_or_default()
    }

    fn set_step(&self, email: &str, step: VerificationStep) {
        store::write_json(self.ephemeral.as_ref(), &session_key(email), &step);
    }

    /// `email → code`: issues a ticket for an authorized email and returns
    /// the code for delivery. Unauthorized emails mutate nothing.
    pub fn request_code(&self, email: &str) -> Result<String, AppError> {
        if !self.engine.is_authorized(email) {
            return Err(AppError::AuthError(
                "This email address is not authorized for the quiz".to_string(),
            ));
        }
        let code = self.engine.issue_code(email);
        self.set_step(email, VerificationStep::Code);
        Ok(code)
    }

    /// `code → name` on success. Discarding the ticket is a postcondition of
    /// this transition, so a verified code can never be replayed. Expired or
    /// exhausted tickets force `code → email`.
    pub fn confirm_code(&self, email: &str, code: &str) -> CodeAttempt {
        match self.engine.verify_code(email, code) {
            VerifyOutcome::Verified => {
                self.engine.discard_ticket(email);
                self.set_step(email, VerificationStep::Name);
                CodeAttempt::Accepted
            }
            VerifyOutcome::Mismatch => CodeAttempt::Rejected,
            outcome @ (VerifyOutcome::Expired
            | VerifyOutcome::Exhausted
            | VerifyOutcome::NoTicket) => {
                self.set_step(email, VerificationStep::Email);
                CodeAttempt::Restart(outcome)
            }
        }
    }

    /// `name → complete`: accepts the display name and upserts the identity
    /// (last-write-wins per email). Rejected without a state change when the
    /// email already finished the quiz.
    pub fn register_name(&self, email: &str, name: &str) -> Result<UserIdentity, AppError> {
        if self.step(email) != VerificationStep::Name {
            return Err(AppError::BadRequest(
                "Name entry is not available for this session".to_string(),
            ));
        }

        let name = name.trim();
        if name.chars().count() < MIN_NAME_LENGTH {
            return Err(AppError::BadRequest(
                "Please enter your full name".to_string(),
            ));
        }

        if results::has_completed(self.durable.as_ref(), email) {
            return Err(AppError::Conflict(
                "This quiz was already completed with this email".to_string(),
            ));
        }

        let user = UserIdentity {
            email: email.to_string(),
            name: name.to_string(),
            is_admin: self.engine.is_admin(email),
            has_completed_quiz: false,
            last_access: Utc::now(),
        };

        let mut all = users(self.durable.as_ref());
        match all.iter_mut().find(|u| u.email == user.email) {
            Some(slot) => *slot = user.clone(),
            None => all.push(user.clone()),
        }
        store::write_json(self.durable.as_ref(), USERS_KEY, &all);

        self.set_step(email, VerificationStep::Complete);
        Ok(user)
    }

    /// `complete → email`: clears every ephemeral trace of the session.
    pub fn logout(&self, email: &str) {
        self.ephemeral.remove(&session_key(email));
        self.engine.discard_ticket(email);
    }
}
