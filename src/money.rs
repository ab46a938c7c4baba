//! Money Parsing Module
//!
//! Unified conversion between user-entered amount strings and the
//! `Decimal` values the flow engine works with. All conversions MUST go
//! through this module.
//!
//! ## Design Principles
//! 1. Explicit Error Handling: No silent truncation
//! 2. Strict input: reject ambiguous formats like ".5" or "5."
//!
//! ## Internal Representation
//! - All amounts are `rust_decimal::Decimal` (wallet currency, 2 display
//!   decimals)
//! - Display formatting is always two fractional digits ("50.00")

use rust_decimal::Decimal;
use thiserror::Error;

/// Wallet currency display precision
pub const DISPLAY_DECIMALS: u32 = 2;

/// Maximum fractional digits accepted from user input
const MAX_INPUT_DECIMALS: usize = 2;

/// Largest amount a single transaction may carry
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Money conversion errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Amount must be greater than zero")]
    NotPositive,

    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: usize, max: usize },

    #[error("Amount exceeds the maximum of {max}")]
    TooLarge { max: Decimal },
}

/// Parse a user-entered amount string into a positive `Decimal`
///
/// # Errors
/// * `InvalidFormat` - Empty, signed, non-numeric, or ambiguous input
/// * `PrecisionOverflow` - More than two fractional digits
/// * `NotPositive` - Zero amount
/// * `TooLarge` - Above [`MAX_AMOUNT`]
pub fn parse_amount(amount_str: &str) -> Result<Decimal, MoneyError> {
    let amount_str = amount_str.trim();
    if amount_str.is_empty() {
        return Err(MoneyError::InvalidFormat("empty string".into()));
    }

    // Explicit signs are rejected: wallet amounts are always positive
    if amount_str.starts_with('-') || amount_str.starts_with('+') {
        return Err(MoneyError::InvalidFormat("signed amount".into()));
    }

    let parts: Vec<&str> = amount_str.split('.').collect();
    let (whole, frac) = match parts.len() {
        1 => (parts[0], ""),
        2 => {
            // Strict check: require both sides of the dot to be non-empty.
            // This prevents ambiguous formats like ".5" or "5."
            if parts[0].is_empty() {
                return Err(MoneyError::InvalidFormat(
                    "missing leading zero (e.g., use 0.5 instead of .5)".into(),
                ));
            }
            if parts[1].is_empty() {
                return Err(MoneyError::InvalidFormat(
                    "missing fractional part (e.g., use 5.0 instead of 5.)".into(),
                ));
            }
            (parts[0], parts[1])
        }
        _ => return Err(MoneyError::InvalidFormat("multiple decimal points".into())),
    };

    // Precision validation: REJECT if too many decimals (no silent truncation!)
    if frac.len() > MAX_INPUT_DECIMALS {
        return Err(MoneyError::PrecisionOverflow {
            provided: frac.len(),
            max: MAX_INPUT_DECIMALS,
        });
    }

    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MoneyError::InvalidFormat(format!(
            "invalid character in amount: {}",
            amount_str
        )));
    }

    let amount: Decimal = amount_str
        .parse()
        .map_err(|_| MoneyError::InvalidFormat(format!("unparseable amount: {}", amount_str)))?;

    if amount <= Decimal::ZERO {
        return Err(MoneyError::NotPositive);
    }

    if amount > MAX_AMOUNT {
        return Err(MoneyError::TooLarge { max: MAX_AMOUNT });
    }

    Ok(amount)
}

/// Format an amount for receipts and status messages ("50.00")
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.prec$}", amount, prec = DISPLAY_DECIMALS as usize)
}
