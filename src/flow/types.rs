//! Flow Core Types
//!
//! Request/record types exchanged between the flow orchestrator and the
//! wallet backend.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core_types::{AccountRole, AccountSummary, TransactionId, TransactionStatus, TransactionType};

/// What the resolved counterparty actually is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecipientKind {
    /// A directory-resolved wallet account
    Wallet { id: String, role: AccountRole },
    /// Synthetic recharge operator (no wallet account behind it)
    Operator { operator: String },
}

/// Resolved counterparty, immutable once the details step passes
///
/// Used only for display during PIN entry and on the receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientSummary {
    pub name: String,
    pub mobile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub kind: RecipientKind,
}

impl RecipientSummary {
    /// Wrap a directory account into a recipient summary
    pub fn from_account(account: &AccountSummary) -> Self {
        Self {
            name: account.name.clone(),
            mobile: account.mobile.clone(),
            photo: account.photo.clone(),
            kind: RecipientKind::Wallet {
                id: account.id.clone(),
                role: account.role,
            },
        }
    }

    /// Synthetic operator recipient for mobile recharge ("Robi Recharge")
    pub fn operator(operator: &str, subscriber_mobile: &str) -> Self {
        Self {
            name: format!("{} Recharge", operator),
            mobile: subscriber_mobile.to_string(),
            photo: None,
            kind: RecipientKind::Operator {
                operator: operator.to_string(),
            },
        }
    }

    /// Wallet account id, if the recipient is one
    pub fn account_id(&self) -> Option<&str> {
        match &self.kind {
            RecipientKind::Wallet { id, .. } => Some(id),
            RecipientKind::Operator { .. } => None,
        }
    }
}

impl fmt::Display for RecipientSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.mobile)
    }
}

/// Fully validated transaction request, built fresh per flow invocation
/// and discarded on completion or cancellation.
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    pub tx_type: TransactionType,
    pub initiator_id: String,
    /// Mobile number or operator subscriber number
    pub recipient_identifier: String,
    pub amount: Decimal,
    pub note: Option<String>,
    /// 4-digit transaction PIN
    pub pin: String,
}

impl fmt::Display for TransactionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // PIN deliberately omitted
        write!(
            f,
            "{} {} -> {} amount={}",
            self.tx_type, self.initiator_id, self.recipient_identifier, self.amount
        )
    }
}

/// Transaction record returned by the backend after submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub tx_type: TransactionType,
    pub amount: Decimal,
    pub status: TransactionStatus,
    /// Millis since epoch
    pub timestamp: i64,
    pub from_id: String,
    pub to_id: String,
    pub from_name: String,
    pub to_name: String,
    pub from_mobile: String,
    pub to_mobile: String,
    #[serde(default)]
    pub description: String,
}

impl fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tx[{}] {} {} -> {} amount={} status={}",
            self.id, self.tx_type, self.from_id, self.to_id, self.amount, self.status
        )
    }
}
