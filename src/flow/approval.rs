//! Request Approval Flow
//!
//! Counterpart to the transaction flow: an agent approves or declines a
//! pending request-money transaction. Two steps only (confirm ->
//! status). Approval is PIN-gated but carries no attempt limit - a
//! wrong PIN clears the buffer and shakes, per the wallet UI.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::flow::backend::{BackendError, WalletBackend};
use crate::flow::pin::{KeyPress, PIN_LENGTH, PinGuard};
use crate::flow::types::TransactionRecord;

/// Terminal result of an approval flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    Approved,
    Declined,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApprovalError {
    #[error("Please enter your 4-digit PIN")]
    PinIncomplete,

    /// Buffer already cleared; shake feedback fires once
    #[error("Incorrect PIN")]
    IncorrectPin,

    #[error("{0}")]
    Failed(String),
}

/// One approval flow instance over a pending request
pub struct ApprovalFlow {
    backend: Arc<dyn WalletBackend>,
    request: TransactionRecord,
    pin: PinGuard,
    outcome: Option<ApprovalOutcome>,
}

impl ApprovalFlow {
    pub fn new(backend: Arc<dyn WalletBackend>, request: TransactionRecord) -> Self {
        Self {
            backend,
            request,
            // No lockout in the approval modal
            pin: PinGuard::new(u8::MAX),
            outcome: None,
        }
    }

    pub fn request(&self) -> &TransactionRecord {
        &self.request
    }

    pub fn outcome(&self) -> Option<ApprovalOutcome> {
        self.outcome
    }

    pub fn press(&mut self, key: KeyPress) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        self.pin.press(key)
    }

    pub fn clear_pin(&mut self) -> bool {
        self.pin.clear()
    }

    pub fn pin_entered(&self) -> usize {
        self.pin.entered()
    }

    /// Approve the request with the entered PIN
    pub async fn approve(&mut self) -> Result<ApprovalOutcome, ApprovalError> {
        if self.outcome.is_some() {
            return Err(ApprovalError::Failed("Flow already resolved".into()));
        }
        let Some(pin) = self.pin.begin_submit() else {
            debug_assert!(self.pin.entered() < PIN_LENGTH);
            return Err(ApprovalError::PinIncomplete);
        };

        info!(tx_id = %self.request.id, "Approving pending request");
        let result = self
            .backend
            .update_request_status(self.request.id, true, Some(&pin))
            .await;

        match result {
            Ok(()) => {
                self.pin.end_submit();
                self.outcome = Some(ApprovalOutcome::Approved);
                Ok(ApprovalOutcome::Approved)
            }
            Err(BackendError::IncorrectPin) => {
                // Clears the buffer; attempts are unbounded here
                let _ = self.pin.record_rejection();
                debug!(tx_id = %self.request.id, "Approval PIN rejected");
                Err(ApprovalError::IncorrectPin)
            }
            Err(err) => {
                self.pin.end_submit();
                Err(ApprovalError::Failed(err.to_string()))
            }
        }
    }

    /// Decline the request. No PIN required.
    pub async fn decline(&mut self) -> Result<ApprovalOutcome, ApprovalError> {
        if self.outcome.is_some() {
            return Err(ApprovalError::Failed("Flow already resolved".into()));
        }

        info!(tx_id = %self.request.id, "Declining pending request");
        self.backend
            .update_request_status(self.request.id, false, None)
            .await
            .map_err(|err| ApprovalError::Failed(err.to_string()))?;

        self.outcome = Some(ApprovalOutcome::Declined);
        Ok(ApprovalOutcome::Declined)
    }
}
