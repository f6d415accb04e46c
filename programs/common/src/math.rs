//! Fixed-point unit helpers
//!
//! On-ledger amounts are raw base units: one whole token of an asset with
//! `d` decimals is `10^d` units. Prices are reported as WAD (1e18 = 1.0) and
//! ratios as basis points (10_000 = 1.0x).

use alloy_primitives::utils::{self as units, ParseUnits, Unit};
use alloy_primitives::U256;
use thiserror::Error;

/// Price precision (18 decimals)
pub const WAD_DECIMALS: u8 = 18;
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Largest supported decimals for an asset
pub const MAX_DECIMALS: u8 = 36;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitsError {
    #[error("invalid decimal amount: {0:?}")]
    Invalid(String),

    #[error("{value:?} has more than {decimals} fractional digits")]
    TooPrecise { value: String, decimals: u8 },

    #[error("{0:?} does not fit in 128 bits")]
    Overflow(String),

    #[error("unsupported decimals {0}")]
    Decimals(u8),
}

/// 10^decimals
#[inline]
pub fn unit(decimals: u8) -> Result<u128, UnitsError> {
    if decimals > MAX_DECIMALS {
        return Err(UnitsError::Decimals(decimals));
    }
    Ok(10u128.pow(decimals as u32))
}

fn alloy_unit(decimals: u8) -> Result<Unit, UnitsError> {
    unit(decimals)?;
    Unit::new(decimals).ok_or(UnitsError::Decimals(decimals))
}

/// Parse a human decimal string into raw units ("0.3" with 18 decimals → 3e17)
///
/// Underscores are accepted as digit separators. Fractional digits beyond
/// `decimals` are rejected rather than truncated.
pub fn parse_units(value: &str, decimals: u8) -> Result<u128, UnitsError> {
    let unit = alloy_unit(decimals)?;
    let cleaned: String = value.trim().chars().filter(|c| *c != '_').collect();
    let invalid = || UnitsError::Invalid(value.to_string());
    let overflow = || UnitsError::Overflow(value.to_string());

    let (whole, frac) = cleaned.split_once('.').unwrap_or((cleaned.as_str(), ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > decimals as usize {
        return Err(UnitsError::TooPrecise {
            value: value.to_string(),
            decimals,
        });
    }

    // Digits are validated above, so the only failure left is width
    match units::parse_units(&cleaned, unit.get()).map_err(|_| overflow())? {
        ParseUnits::U256(raw) => u128::try_from(raw).map_err(|_| overflow()),
        ParseUnits::I256(_) => Err(invalid()),
    }
}

/// Format raw units as a human decimal string, trimming trailing zeros
pub fn format_units(amount: u128, decimals: u8) -> String {
    let Ok(unit) = alloy_unit(decimals) else {
        return amount.to_string();
    };
    match units::format_units(U256::from(amount), unit.get()) {
        Ok(text) if text.contains('.') => {
            text.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        Ok(text) => text,
        Err(_) => amount.to_string(),
    }
}

/// Format a basis-point ratio as a multiplier ("30000" → "3x")
pub fn format_bps(bps: u64) -> String {
    format!("{}x", format_units(bps as u128, 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_units("1", 18).unwrap(), WAD);
        assert_eq!(parse_units("0.3", 18).unwrap(), 3 * WAD / 10);
        assert_eq!(parse_units("1_000_000", 18).unwrap(), 1_000_000 * WAD);
        assert_eq!(parse_units(".5", 6).unwrap(), 500_000);
        assert_eq!(parse_units("12", 0).unwrap(), 12);
    }

    #[test]
    fn test_parse_units_rejects_garbage() {
        assert!(matches!(parse_units("", 18), Err(UnitsError::Invalid(_))));
        assert!(matches!(parse_units("-1", 18), Err(UnitsError::Invalid(_))));
        assert!(matches!(parse_units("1.2.3", 18), Err(UnitsError::Invalid(_))));
        assert!(matches!(parse_units("0.1234567", 6), Err(UnitsError::TooPrecise { .. })));
        assert!(matches!(
            parse_units("1000000000000000000000000", 18),
            Err(UnitsError::Overflow(_))
        ));
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(3 * WAD / 10, 18), "0.3");
        assert_eq!(format_units(300_000 * WAD, 18), "300000");
        assert_eq!(format_units(1_500_000, 6), "1.5");
        assert_eq!(format_units(7, 0), "7");
        assert_eq!(format_units(0, 18), "0");
        assert_eq!(format_units(10 * WAD, 18), "10");
    }

    #[test]
    fn test_format_bps() {
        assert_eq!(format_bps(30_000), "3x");
        assert_eq!(format_bps(15_000), "1.5x");
    }
}
