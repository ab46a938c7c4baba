//! Amount Validator
//!
//! Runs strictly after recipient resolution. Positivity comes from the
//! money parser; the balance check applies only to debit-type flows and
//! uses the initiator's last-known cached balance.

use rust_decimal::Decimal;

use crate::core_types::TransactionType;
use crate::flow::error::FlowError;
use crate::money;

/// Validate a raw amount string for `tx_type` against `cached_balance`
pub fn validate(
    raw: &str,
    tx_type: TransactionType,
    cached_balance: Decimal,
) -> Result<Decimal, FlowError> {
    let amount = money::parse_amount(raw)?;

    if tx_type.is_debit() && amount > cached_balance {
        return Err(FlowError::InsufficientBalance);
    }

    Ok(amount)
}
