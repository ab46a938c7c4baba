//! Mock Wallet Backend
//!
//! In-process backend for tests and the demo binary. Submission results
//! can be scripted per call; counters expose exactly how many times each
//! operation fired.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::core_types::{AccountRole, AccountSummary, TransactionId, TransactionStatus};
use crate::flow::backend::{BackendError, WalletBackend};
use crate::flow::types::{TransactionRecord, TransactionRequest};

/// Scripted result for the next `submit_transaction` call
#[derive(Debug, Clone)]
pub enum ScriptedSubmit {
    Success(TransactionStatus),
    IncorrectPin,
    Reject(String),
    Unavailable(String),
}

/// Scriptable in-memory backend
pub struct MockBackend {
    account: AccountSummary,
    directory: Vec<AccountSummary>,
    correct_pin: String,
    submit_script: Mutex<VecDeque<ScriptedSubmit>>,

    resolve_calls: AtomicUsize,
    submit_calls: AtomicUsize,
    update_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
}

impl MockBackend {
    /// Backend for `account`, verifying `correct_pin` on submissions
    pub fn new(account: AccountSummary, correct_pin: &str) -> Self {
        Self {
            account,
            directory: Vec::new(),
            correct_pin: correct_pin.to_string(),
            submit_script: Mutex::new(VecDeque::new()),
            resolve_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
        }
    }

    /// Add a resolvable directory account
    pub fn with_directory_account(mut self, account: AccountSummary) -> Self {
        self.directory.push(account);
        self
    }

    /// Queue a scripted result for an upcoming submission. When the
    /// queue is empty, submissions verify the PIN and succeed.
    pub fn script_submit(&self, result: ScriptedSubmit) {
        self.submit_script.lock().unwrap().push_back(result);
    }

    pub fn resolve_count(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    pub fn submit_count(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn build_record(
        &self,
        request: &TransactionRequest,
        status: TransactionStatus,
    ) -> TransactionRecord {
        let recipient = self
            .directory
            .iter()
            .find(|a| a.mobile == request.recipient_identifier);
        TransactionRecord {
            id: TransactionId::new(),
            tx_type: request.tx_type,
            amount: request.amount,
            status,
            timestamp: chrono::Utc::now().timestamp_millis(),
            from_id: self.account.id.clone(),
            to_id: recipient.map(|a| a.id.clone()).unwrap_or_default(),
            from_name: self.account.name.clone(),
            to_name: recipient.map(|a| a.name.clone()).unwrap_or_default(),
            from_mobile: self.account.mobile.clone(),
            to_mobile: request.recipient_identifier.clone(),
            description: request.note.clone().unwrap_or_default(),
        }
    }
}

#[async_trait]
impl WalletBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn resolve_recipient(
        &self,
        identifier: &str,
    ) -> Result<Option<AccountSummary>, BackendError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        if identifier == self.account.mobile {
            return Ok(Some(self.account.clone()));
        }
        Ok(self
            .directory
            .iter()
            .find(|a| a.mobile == identifier)
            .cloned())
    }

    async fn submit_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<TransactionRecord, BackendError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self.submit_script.lock().unwrap().pop_front();
        match scripted {
            Some(ScriptedSubmit::Success(status)) => Ok(self.build_record(request, status)),
            Some(ScriptedSubmit::IncorrectPin) => Err(BackendError::IncorrectPin),
            Some(ScriptedSubmit::Reject(reason)) => Err(BackendError::Rejected(reason)),
            Some(ScriptedSubmit::Unavailable(reason)) => Err(BackendError::Unavailable(reason)),
            None => {
                if request.pin != self.correct_pin {
                    return Err(BackendError::IncorrectPin);
                }
                let status = if request.tx_type == crate::core_types::TransactionType::RequestMoney
                {
                    TransactionStatus::Pending
                } else {
                    TransactionStatus::Successful
                };
                Ok(self.build_record(request, status))
            }
        }
    }

    async fn update_request_status(
        &self,
        _tx_id: TransactionId,
        approve: bool,
        pin: Option<&str>,
    ) -> Result<(), BackendError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if approve && pin != Some(self.correct_pin.as_str()) {
            return Err(BackendError::IncorrectPin);
        }
        Ok(())
    }

    async fn refresh_account(&self) -> Result<AccountSummary, BackendError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.account.clone())
    }

    async fn contacts(&self, role: AccountRole) -> Result<Vec<AccountSummary>, BackendError> {
        Ok(self
            .directory
            .iter()
            .filter(|a| a.role == role)
            .cloned()
            .collect())
    }
}
