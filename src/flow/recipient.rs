//! Recipient Resolver
//!
//! Looks up and validates the counterparty for a flow. Role matching is
//! an explicit (initiator role, transaction type) -> expected role table
//! so new transaction types extend it without touching the resolver.

use once_cell::sync::Lazy;
use tracing::debug;

use crate::core_types::{AccountRole, AccountSummary, TransactionType};
use crate::flow::backend::{BackendError, WalletBackend};
use crate::flow::error::FlowError;
use crate::flow::types::RecipientSummary;

/// Counterparty decision table
///
/// Personal accounts cash out through agents and request money from
/// agents; everything else pairs with a personal account. Agents always
/// face personal customers. Admin-initiated flows (manual adjustments in
/// the console) target personal accounts as well.
static COUNTERPARTY_TABLE: Lazy<Vec<((AccountRole, TransactionType), AccountRole)>> =
    Lazy::new(|| {
        use AccountRole::*;
        use TransactionType::*;
        vec![
            ((Personal, CashOut), Agent),
            ((Personal, RequestMoney), Agent),
            ((Personal, SendMoney), Personal),
            ((Personal, CashIn), Personal),
            ((Agent, CashIn), Personal),
            ((Agent, CashOut), Personal),
            ((Agent, SendMoney), Personal),
            ((Agent, RequestMoney), Personal),
            ((Admin, SendMoney), Personal),
        ]
    });

/// Expected counterparty role for (initiator role, transaction type)
pub fn expected_counterparty(initiator: AccountRole, tx_type: TransactionType) -> AccountRole {
    COUNTERPARTY_TABLE
        .iter()
        .find(|((role, tt), _)| *role == initiator && *tt == tx_type)
        .map(|(_, expected)| *expected)
        .unwrap_or(AccountRole::Personal)
}

/// Resolves and validates recipients against the backend directory
pub struct RecipientResolver<'a> {
    backend: &'a dyn WalletBackend,
}

impl<'a> RecipientResolver<'a> {
    pub fn new(backend: &'a dyn WalletBackend) -> Self {
        Self { backend }
    }

    /// Resolve `identifier` for a flow of `tx_type` started by `initiator`.
    ///
    /// Mobile recharge skips the directory entirely and wraps the number
    /// into a synthetic operator recipient. All other types must resolve
    /// to an existing, non-self account of the expected role.
    pub async fn resolve(
        &self,
        identifier: &str,
        operator: &str,
        tx_type: TransactionType,
        initiator: &AccountSummary,
    ) -> Result<RecipientSummary, FlowError> {
        if !tx_type.uses_directory_lookup() {
            debug!(mobile = %identifier, operator = %operator, "Synthetic operator recipient");
            return Ok(RecipientSummary::operator(operator, identifier));
        }

        let found = self
            .backend
            .resolve_recipient(identifier)
            .await
            .map_err(map_lookup_error)?
            .ok_or_else(|| FlowError::RecipientNotFound(identifier.to_string()))?;

        if found.id == initiator.id {
            return Err(FlowError::SelfTransactionNotAllowed);
        }

        let expected = expected_counterparty(initiator.role, tx_type);
        if found.role != expected {
            debug!(
                found = %found.role,
                expected = %expected,
                tx_type = %tx_type,
                "Recipient role mismatch"
            );
            return Err(FlowError::RecipientTypeMismatch { expected });
        }

        Ok(RecipientSummary::from_account(&found))
    }
}

fn map_lookup_error(err: BackendError) -> FlowError {
    match err {
        // A PIN error from a read-only lookup is a backend contract
        // violation; surface it as unavailable rather than retrying.
        BackendError::IncorrectPin => FlowError::BackendUnavailable("unexpected PIN error".into()),
        BackendError::Rejected(reason) => FlowError::SubmissionFailed(reason),
        BackendError::Unavailable(reason) => FlowError::BackendUnavailable(reason),
    }
}
