//! Decimal amount parsing and formatting.
//!
//! Amounts travel through the system as integers in base units (wei,
//! token base units, planck); humans and config files use decimal strings.

use alloy::primitives::utils::{format_units, parse_units, UnitsError};
use alloy::primitives::U256;
use thiserror::Error;

/// Errors produced while converting amounts.
#[derive(Debug, Error)]
pub enum AmountError {
    /// The text is not a valid non-negative decimal number.
    #[error("invalid amount '{0}'")]
    Invalid(String),

    /// The value does not fit the target integer type.
    #[error("amount {0} does not fit in 128 bits")]
    Overflow(U256),

    /// Underlying unit conversion failure.
    #[error("unit conversion failed: {0}")]
    Units(#[from] UnitsError),
}

/// Parse a decimal string (e.g. `"0.1"`) into base units.
///
/// More significant fractional digits than `decimals` is an error, never a
/// truncation.
pub fn parse_amount(text: &str, decimals: u8) -> Result<U256, AmountError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('-') {
        return Err(AmountError::Invalid(text.to_string()));
    }
    if let Some((_, fraction)) = trimmed.split_once('.') {
        if fraction.trim_end_matches('0').len() > decimals as usize {
            return Err(AmountError::Invalid(text.to_string()));
        }
    }
    let parsed = parse_units(trimmed, decimals)?;
    Ok(parsed.get_absolute())
}

/// Format base units as a decimal string.
pub fn format_amount(value: U256, decimals: u8) -> String {
    format_units(value, decimals).unwrap_or_else(|_| value.to_string())
}

/// Format a planck balance with the chain's decimals.
pub fn format_planck(value: u128, decimals: u8) -> String {
    format_amount(U256::from(value), decimals)
}

/// Narrow a parsed amount to planck.
pub fn to_planck(value: U256) -> Result<u128, AmountError> {
    u128::try_from(value).map_err(|_| AmountError::Overflow(value))
}

/// Lossy conversion to `f64` for price estimates.
pub fn to_f64(value: U256, decimals: u8) -> f64 {
    format_amount(value, decimals).parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ether_amount() {
        let wei = parse_amount("0.1", 18).unwrap();
        assert_eq!(wei, U256::from(100_000_000_000_000_000u128));
    }

    #[test]
    fn test_parse_dot_amount() {
        let planck = to_planck(parse_amount("1.5", 10).unwrap()).unwrap();
        assert_eq!(planck, 15_000_000_000);
    }

    #[test]
    fn test_rejects_negative_and_garbage() {
        assert!(parse_amount("-1", 18).is_err());
        assert!(parse_amount("", 18).is_err());
        assert!(parse_amount("abc", 18).is_err());
    }

    #[test]
    fn test_rejects_excess_precision() {
        assert!(matches!(parse_amount("1.0000009", 6), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_amount("0.0000001", 6), Err(AmountError::Invalid(_))));
        assert!(parse_amount("0.00000000001", 10).is_err());

        // Trailing zeros carry no precision.
        assert_eq!(parse_amount("1.50000000", 6).unwrap(), U256::from(1_500_000u64));
        assert_eq!(parse_amount("0.000001", 6).unwrap(), U256::from(1u64));
    }

    #[test]
    fn test_to_planck_overflow() {
        let huge = U256::from(u128::MAX) + U256::from(1u8);
        assert!(matches!(to_planck(huge), Err(AmountError::Overflow(_))));
    }

    #[test]
    fn test_format_planck() {
        assert!(format_planck(12_345_000_000, 10).starts_with("1.2345"));
    }
}
