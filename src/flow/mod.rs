//! Transaction Flow Engine
//!
//! The multi-step authorization wizard behind every wallet money
//! movement: details -> pin -> status.
//!
//! - [`state`] - wizard step machine
//! - [`recipient`] - counterparty resolution and role matching
//! - [`amount`] - amount validation against the cached balance
//! - [`pin`] - PIN entry, attempts, lockout
//! - [`hold`] - hold-to-confirm gesture timers
//! - [`outcome`] - submission result classification
//! - [`coordinator`] - the flow orchestrator task
//! - [`approval`] - agent approval of pending requests
//! - [`backend`] - the wallet service interface

pub mod amount;
pub mod approval;
pub mod backend;
pub mod coordinator;
pub mod error;
pub mod hold;
pub mod outcome;
pub mod pin;
pub mod recipient;
pub mod state;
pub mod types;

#[cfg(all(test, feature = "mock-backend"))]
mod integration_tests;

pub use backend::{BackendError, WalletBackend};
pub use coordinator::{FlowCommand, FlowEvent, FlowHandle, FlowParams, TransactionFlow};
pub use error::FlowError;
pub use outcome::Outcome;
pub use state::FlowStep;
pub use types::{RecipientKind, RecipientSummary, TransactionRecord, TransactionRequest};
