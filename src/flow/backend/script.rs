//! Hosted Script Backend
//!
//! The production wallet talks to a hosted script endpoint: a single
//! URL accepting JSON `POST { action, params }` and answering
//! `{ data }` or `{ error }`. Record ids on the wire are canonical ULID
//! strings. The one piece of error classification that matters lives
//! here: a remote error mentioning "Incorrect PIN" maps to
//! `BackendError::IncorrectPin`; everything else is a plain rejection.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::BackendConfig;
use crate::core_types::{AccountRole, AccountSummary, TransactionId};
use crate::flow::backend::{BackendError, WalletBackend};
use crate::flow::types::{TransactionRecord, TransactionRequest};

const INCORRECT_PIN_MARKER: &str = "Incorrect PIN";

/// JSON POST client for the hosted wallet script
pub struct ScriptBackend {
    client: reqwest::Client,
    url: String,
    /// Authenticated account id, attached to every call
    account_id: String,
}

// The `bound` override stops serde inferring a `T: Default` bound from
// the defaulted fields; `call` only has `T: DeserializeOwned`.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
struct ApiEnvelope<T> {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Option<T>,
}

/// Wire shape of a wallet user
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireUser {
    id: String,
    mobile: String,
    name: String,
    user_type: AccountRole,
    balance: Decimal,
    #[serde(default)]
    photo_base64: Option<String>,
}

impl From<WireUser> for AccountSummary {
    fn from(user: WireUser) -> Self {
        AccountSummary {
            id: user.id,
            mobile: user.mobile,
            name: user.name,
            role: user.user_type,
            balance: user.balance,
            photo: user.photo_base64,
        }
    }
}

impl ScriptBackend {
    pub fn new(config: &BackendConfig, account_id: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            url: config.url.clone(),
            account_id: account_id.to_string(),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        action: &str,
        params: serde_json::Value,
    ) -> Result<T, BackendError> {
        debug!(action, "Backend call");
        let response = self
            .client
            .post(&self.url)
            .json(&json!({
                "action": action,
                "callerId": self.account_id,
                "params": params,
            }))
            .send()
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| BackendError::Unavailable(format!("bad response: {}", e)))?;

        if let Some(message) = envelope.error {
            return Err(classify_remote_error(message));
        }
        envelope
            .data
            .ok_or_else(|| BackendError::Unavailable("empty response".into()))
    }
}

fn classify_remote_error(message: String) -> BackendError {
    if message.contains(INCORRECT_PIN_MARKER) {
        BackendError::IncorrectPin
    } else {
        BackendError::Rejected(message)
    }
}

#[async_trait]
impl WalletBackend for ScriptBackend {
    fn name(&self) -> &'static str {
        "script"
    }

    async fn resolve_recipient(
        &self,
        identifier: &str,
    ) -> Result<Option<AccountSummary>, BackendError> {
        let user: Option<WireUser> = self
            .call("getUserByMobile", json!({ "mobile": identifier }))
            .await?;
        Ok(user.map(AccountSummary::from))
    }

    async fn submit_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<TransactionRecord, BackendError> {
        self.call(
            "performTransaction",
            json!({
                "type": request.tx_type,
                "toMobile": request.recipient_identifier,
                "amount": request.amount,
                "pin": request.pin,
                "reference": request.note,
            }),
        )
        .await
    }

    async fn update_request_status(
        &self,
        tx_id: TransactionId,
        approve: bool,
        pin: Option<&str>,
    ) -> Result<(), BackendError> {
        let status = if approve { "SUCCESSFUL" } else { "FAILED" };
        // The script answers `{ data: true }` here; the payload is
        // irrelevant beyond error detection
        let _: bool = self
            .call(
                "updateRequestStatus",
                json!({
                    "transactionId": tx_id.to_string(),
                    "status": status,
                    "pin": pin,
                }),
            )
            .await?;
        Ok(())
    }

    async fn refresh_account(&self) -> Result<AccountSummary, BackendError> {
        let user: WireUser = self.call("getCurrentUser", json!({})).await?;
        Ok(user.into())
    }

    async fn contacts(&self, role: AccountRole) -> Result<Vec<AccountSummary>, BackendError> {
        let users: Vec<WireUser> = self
            .call("getContacts", json!({ "recipientType": role }))
            .await
            .inspect_err(|err| warn!(error = %err, "Contact fetch failed"))?;
        Ok(users.into_iter().map(AccountSummary::from).collect())
    }
}
