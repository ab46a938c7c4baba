//! Wallet Backend Interface
//!
//! The flow engine consumes the remote wallet service through this
//! trait. Errors must stay machine-distinguishable: an incorrect PIN is
//! the only failure the pin step may retry.

use async_trait::async_trait;
use thiserror::Error;

use crate::core_types::{AccountRole, AccountSummary, TransactionId};
use crate::flow::types::{TransactionRecord, TransactionRequest};

#[cfg(feature = "mock-backend")]
mod mock;
mod script;

#[cfg(feature = "mock-backend")]
pub use mock::{MockBackend, ScriptedSubmit};
pub use script::ScriptBackend;

/// Backend call failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Wrong transaction PIN - the only retryable submission failure
    #[error("Incorrect PIN")]
    IncorrectPin,

    /// Business rejection (limits, frozen account, ...) with the
    /// backend's user-facing reason
    #[error("{0}")]
    Rejected(String),

    /// Transport or service failure
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl BackendError {
    #[inline]
    pub fn is_incorrect_pin(&self) -> bool {
        matches!(self, BackendError::IncorrectPin)
    }
}

/// Abstract wallet service consumed by the flow engine
#[async_trait]
pub trait WalletBackend: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Directory lookup by mobile number. `Ok(None)` means no account.
    async fn resolve_recipient(
        &self,
        identifier: &str,
    ) -> Result<Option<AccountSummary>, BackendError>;

    /// Execute a transaction. The PIN is verified remotely; a wrong PIN
    /// must come back as `BackendError::IncorrectPin`.
    async fn submit_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<TransactionRecord, BackendError>;

    /// Approve (`approve = true`, PIN required) or decline a pending
    /// request-money transaction.
    async fn update_request_status(
        &self,
        tx_id: TransactionId,
        approve: bool,
        pin: Option<&str>,
    ) -> Result<(), BackendError>;

    /// Re-fetch the authenticated account (balance/profile). Invoked
    /// once after every flow closure regardless of outcome.
    async fn refresh_account(&self) -> Result<AccountSummary, BackendError>;

    /// Contact suggestions for the details step, filtered by the
    /// expected counterparty role.
    async fn contacts(&self, role: AccountRole) -> Result<Vec<AccountSummary>, BackendError>;
}
