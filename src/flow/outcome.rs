//! Transaction Outcome Classifier
//!
//! Maps the backend submission result into the flow's terminal states.
//! An incorrect PIN is the single retryable disposition; every other
//! error is a generic failure - no silent retries, no fallback paths.

use crate::core_types::TransactionStatus;
use crate::flow::backend::BackendError;
use crate::flow::types::TransactionRecord;

/// Terminal outcome rendered at the status step
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Successful(TransactionRecord),
    /// Approval-required flows (request-money) come back pending
    Pending(TransactionRecord),
    Failed(String),
}

impl Outcome {
    #[inline]
    pub fn is_successful(&self) -> bool {
        matches!(self, Outcome::Successful(_))
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending(_))
    }

    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    /// The record behind a non-failed outcome
    pub fn record(&self) -> Option<&TransactionRecord> {
        match self {
            Outcome::Successful(r) | Outcome::Pending(r) => Some(r),
            Outcome::Failed(_) => None,
        }
    }
}

/// What the coordinator does with a resolved submission
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitDisposition {
    /// Advance to the status step with this outcome
    Terminal(Outcome),
    /// Route to the PIN guard's rejection transition, stay on the pin step
    RetryPin,
}

/// Classify a resolved submission call
pub fn classify(result: Result<TransactionRecord, BackendError>) -> SubmitDisposition {
    match result {
        Ok(record) => {
            let outcome = if record.status == TransactionStatus::Pending {
                Outcome::Pending(record)
            } else {
                Outcome::Successful(record)
            };
            SubmitDisposition::Terminal(outcome)
        }
        Err(BackendError::IncorrectPin) => SubmitDisposition::RetryPin,
        Err(err) => SubmitDisposition::Terminal(Outcome::Failed(err.to_string())),
    }
}
