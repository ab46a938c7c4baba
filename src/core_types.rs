//! Core domain types for the FinPay flow engine
//!
//! Small, copy-friendly primitives used across every module.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Transaction ID type - ULID-based unique identifier
///
/// Using ULID provides:
/// - Monotonic, sortable IDs
/// - No coordination needed (no machine_id)
/// - 128-bit with good entropy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(ulid::Ulid);

impl TransactionId {
    /// Generate a new unique TransactionId
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Get the inner ULID value
    pub fn inner(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransactionId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

// Serialized as the canonical ULID string
impl Serialize for TransactionId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TransactionId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Account role - determines who may transact with whom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountRole {
    /// Personal wallet account
    Personal,
    /// Agent account (cash-in/out points, request approvers)
    Agent,
    /// Administrative account (console only, never a counterparty)
    Admin,
}

impl AccountRole {
    /// Get human-readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::Personal => "PERSONAL",
            AccountRole::Agent => "AGENT",
            AccountRole::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transaction type (what kind of money movement the flow performs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Personal -> Personal transfer
    SendMoney,
    /// Agent deposits cash into a personal wallet
    CashIn,
    /// Personal withdraws cash through an agent
    CashOut,
    /// Prepaid airtime top-up (synthetic operator recipient)
    MobileRecharge,
    /// Personal asks an agent for funds; settles on approval
    RequestMoney,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::SendMoney => "SEND_MONEY",
            TransactionType::CashIn => "CASH_IN",
            TransactionType::CashOut => "CASH_OUT",
            TransactionType::MobileRecharge => "MOBILE_RECHARGE",
            TransactionType::RequestMoney => "REQUEST_MONEY",
        }
    }

    /// Whether this type debits the initiator's cached balance.
    ///
    /// RequestMoney is the single credit-type flow: funds move only when
    /// the counterparty approves, so no balance check applies up front.
    /// Every direction-of-funds decision routes through this predicate.
    #[inline]
    pub fn is_debit(&self) -> bool {
        !matches!(self, TransactionType::RequestMoney)
    }

    /// Whether recipient resolution goes through the backend directory.
    /// Recharge targets are raw subscriber numbers, not wallet accounts.
    #[inline]
    pub fn uses_directory_lookup(&self) -> bool {
        !matches!(self, TransactionType::MobileRecharge)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal status of a submitted transaction, as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Awaiting counterparty approval (request-money)
    Pending,
    Successful,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Successful => "SUCCESSFUL",
            TransactionStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of the authenticated account driving a flow
///
/// `balance` is the last-known cached figure; the engine never re-reads it
/// mid-flow, only at amount validation and via `refresh_account` after
/// closure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: String,
    pub mobile: String,
    pub name: String,
    pub role: AccountRole,
    pub balance: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}
