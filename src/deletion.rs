// src/deletion.rs

//! Two-step confirmation gate in front of destructive administrator
//! actions: the system shows a random code, the operator re-enters it, and
//! only an exact match releases the recorded action. A friction gate for a
//! single trusted operator, not an authentication mechanism.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::store::{self, DELETION_KEY, KeyValueStore};
use crate::verification::generate_code;

/// The destructive action held back until the code is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingAction {
    Question { id: String },
    Result { id: String },
    AllResults,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionStage {
    CodeShown,
    AwaitingConfirmation,
}

/// The single in-flight confirmation. Idle is the absence of this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingDeletion {
    pub code: String,
    pub stage: DeletionStage,
    pub action: PendingAction,
}

pub struct DeletionWorkflow {
    ephemeral: Arc<dyn KeyValueStore>,
}

impl DeletionWorkflow {
    pub fn new(ephemeral: Arc<dyn KeyValueStore>) -> Self {
        Self { ephemeral }
    }

    pub fn current(&self) -> Option<PendingDeletion> {
        store::read_json(self.ephemeral.as_ref(), DELETION_KEY)
    }

    /// `Idle → CodeShown`: records the action and returns the display code.
    /// Starting over while another confirmation is pending replaces it.
    pub fn begin(&self, action: PendingAction) -> String {
        let code = generate_code();
        let pending = PendingDeletion {
            code: code.clone(),
            stage: DeletionStage::CodeShown,
            action,
        };
        store::write_json(self.ephemeral.as_ref(), DELETION_KEY, &pending);
        code
    }

    /// `CodeShown → AwaitingConfirmation`: the operator has seen the code.
    pub fn acknowledge(&self) -> Result<(), AppError> {
        let mut pending = self.current().ok_or_else(|| {
            AppError::BadRequest("No deletion is pending".to_string())
        })?;
        pending.stage = DeletionStage::AwaitingConfirmation;
        store::write_json(self.ephemeral.as_ref(), DELETION_KEY, &pending);
        Ok(())
    }

    /// `AwaitingConfirmation → Applied`: an exact code match clears the
    /// workflow and hands the action back for execution. A mismatch keeps
    /// the code and the pending action so the operator may retry.
    pub fn confirm(&self, submitted: &str) -> Result<PendingAction, AppError> {
        let pending = self.current().ok_or_else(|| {
            AppError::BadRequest("No deletion is pending".to_string())
        })?;

        if pending.stage != DeletionStage::AwaitingConfirmation {
            return Err(AppError::BadRequest(
                "The deletion code has not been acknowledged yet".to_string(),
            ));
        }

        if pending.code != submitted {
            return Err(AppError::BadRequest(
                "The confirmation code does not match".to_string(),
            ));
        }

        self.ephemeral.remove(DELETION_KEY);
        Ok(pending.action)
    }

    /// `* → Idle`: discards the pending action; nothing is mutated.
    pub fn cancel(&self) {
        self.ephemeral.remove(DELETION_KEY);
    }
}
