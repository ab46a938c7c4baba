//! Flow Error Types
//!
//! Every failure a transaction flow can surface, split by where it is
//! recovered: details-step errors stay inline, incorrect PIN retries at
//! the pin step, everything else ends the flow.

use thiserror::Error;

use crate::core_types::AccountRole;
use crate::money::MoneyError;

/// Flow error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    // === Details-step errors (recoverable inline) ===
    #[error("No account found for {0}")]
    RecipientNotFound(String),

    #[error("You cannot transact with yourself")]
    SelfTransactionNotAllowed,

    #[error("Invalid recipient type. Expected a {expected} account")]
    RecipientTypeMismatch { expected: AccountRole },

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] MoneyError),

    #[error("Insufficient balance")]
    InsufficientBalance,

    // === Pin-step errors ===
    #[error("Incorrect PIN. {attempts_left} attempt(s) remaining")]
    IncorrectPin { attempts_left: u8 },

    // === Terminal submission errors ===
    #[error("Transaction failed: {0}")]
    SubmissionFailed(String),

    #[error("Service unavailable: {0}")]
    BackendUnavailable(String),
}

impl FlowError {
    /// Errors recovered inline at the details step (flow stays alive)
    pub fn is_details_error(&self) -> bool {
        matches!(
            self,
            FlowError::RecipientNotFound(_)
                | FlowError::SelfTransactionNotAllowed
                | FlowError::RecipientTypeMismatch { .. }
                | FlowError::InvalidAmount(_)
                | FlowError::InsufficientBalance
        )
    }

    /// The only submission failure that keeps the flow at the pin step
    pub fn is_pin_retryable(&self) -> bool {
        matches!(self, FlowError::IncorrectPin { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_error_classification() {
        assert!(FlowError::RecipientNotFound("017".into()).is_details_error());
        assert!(FlowError::SelfTransactionNotAllowed.is_details_error());
        assert!(FlowError::InsufficientBalance.is_details_error());
        assert!(!FlowError::IncorrectPin { attempts_left: 2 }.is_details_error());
        assert!(!FlowError::SubmissionFailed("x".into()).is_details_error());
    }

    #[test]
    fn test_pin_retryable_classification() {
        assert!(FlowError::IncorrectPin { attempts_left: 2 }.is_pin_retryable());
        assert!(!FlowError::SubmissionFailed("x".into()).is_pin_retryable());
        assert!(!FlowError::BackendUnavailable("down".into()).is_pin_retryable());
    }

    #[test]
    fn test_messages_are_user_facing() {
        let err = FlowError::RecipientTypeMismatch {
            expected: AccountRole::Agent,
        };
        assert_eq!(
            err.to_string(),
            "Invalid recipient type. Expected a AGENT account"
        );
        let err = FlowError::IncorrectPin { attempts_left: 1 };
        assert_eq!(err.to_string(), "Incorrect PIN. 1 attempt(s) remaining");
    }
}
