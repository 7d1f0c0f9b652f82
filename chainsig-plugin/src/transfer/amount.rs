//! Decimal to base-unit conversion
//!
//! Amounts arrive as human decimal text ("0.001") and leave as integer
//! base-unit strings ("100000"). The conversion shifts the decimal mantissa,
//! so it is exact at full chain precision. No floating point anywhere.

use rust_decimal::Decimal;

use crate::error::ValidationError;

/// Satoshis per BTC: 10^8.
pub const BTC_DECIMALS: u32 = 8;
/// Wei per ETH: 10^18.
pub const EVM_DECIMALS: u32 = 18;

/// Converts a positive decimal amount into an integer base-unit string.
///
/// Rejects non-positive values, amounts with more fractional digits than the
/// chain supports, and values too large to represent.
pub fn to_base_units(amount: &str, decimals: u32) -> Result<String, ValidationError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidAmount("empty amount".to_string()));
    }

    let parsed = Decimal::from_str_exact(trimmed)
        .map_err(|e| {
            ValidationError::InvalidAmount(format!("'{}' is not a decimal number: {}", trimmed, e))
        })?
        .normalize();

    if parsed <= Decimal::ZERO {
        return Err(ValidationError::InvalidAmount(format!(
            "amount must be positive, got '{}'",
            trimmed
        )));
    }
    if parsed.scale() > decimals {
        return Err(ValidationError::InvalidAmount(format!(
            "'{}' has more than {} decimal places",
            trimmed, decimals
        )));
    }

    // scale <= decimals here, so the result is mantissa * 10^(decimals - scale)
    let shift = decimals - parsed.scale();
    let base = 10i128
        .checked_pow(shift)
        .and_then(|factor| parsed.mantissa().checked_mul(factor))
        .ok_or_else(|| {
            ValidationError::InvalidAmount(format!("'{}' is out of range", trimmed))
        })?;
    Ok(base.to_string())
}
