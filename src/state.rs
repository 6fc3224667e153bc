// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::bank;
use crate::config::Config;
use crate::deletion::DeletionWorkflow;
use crate::mailer::VerificationMailer;
use crate::session::SessionFlow;
use crate::store::KeyValueStore;
use crate::verification::VerificationEngine;

/// Shared application state: the two storage scopes (injected so tests can
/// substitute in-memory fakes), the relay client, and the configuration.
#[derive(Clone)]
pub struct AppState {
    pub durable: Arc<dyn KeyValueStore>,
    pub ephemeral: Arc<dyn KeyValueStore>,
    pub mailer: Arc<dyn VerificationMailer>,
    pub config: Config,
}

impl AppState {
    pub fn verification(&self) -> VerificationEngine {
        VerificationEngine::new(
            self.ephemeral.clone(),
            self.config.allowed_emails.clone(),
            self.config.admin_email.clone(),
        )
    }

    pub fn sessions(&self) -> SessionFlow {
        SessionFlow::new(
            self.durable.clone(),
            self.ephemeral.clone(),
            self.verification(),
        )
    }

    pub fn deletions(&self) -> DeletionWorkflow {
        DeletionWorkflow::new(self.ephemeral.clone())
    }

    /// Materializes the default configuration on first call.
    pub fn quiz_config(&self) -> crate::models::quiz_config::QuizConfig {
        bank::get_config(self.durable.as_ref())
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
