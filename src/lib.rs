//! FinPay - Mobile Wallet Transaction Authorization Engine
//!
//! The headless core behind the wallet's money-movement wizard.
//!
//! # Modules
//!
//! - [`core_types`] - Core type definitions (TransactionId, roles, types)
//! - [`money`] - Strict amount parsing and display formatting
//! - [`flow`] - The transaction flow state machine and its collaborators
//! - [`config`] - YAML application configuration
//! - [`logging`] - tracing subscriber bootstrap

// Core types - must be first!
pub mod core_types;

pub mod config;
pub mod logging;
pub mod money;

// The flow engine
pub mod flow;

// Convenient re-exports at crate root
pub use config::{AppConfig, FlowConfig};
pub use core_types::{
    AccountRole, AccountSummary, TransactionId, TransactionStatus, TransactionType,
};
pub use flow::{
    BackendError, FlowCommand, FlowError, FlowEvent, FlowHandle, FlowParams, FlowStep, Outcome,
    RecipientSummary, TransactionFlow, TransactionRecord, WalletBackend,
};

#[cfg(feature = "mock-backend")]
pub use flow::backend::{MockBackend, ScriptedSubmit};
pub use flow::backend::ScriptBackend;
