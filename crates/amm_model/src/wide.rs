//! 256-bit helpers for u128 amounts

use alloy_primitives::U256;

use crate::AmmError;

/// Widen a u128 amount
#[inline]
pub fn widen(x: u128) -> U256 {
    U256::from(x)
}

/// Narrow back to u128, failing on overflow
#[inline]
pub fn narrow(x: U256) -> Result<u128, AmmError> {
    u128::try_from(x).map_err(|_| AmmError::Overflow)
}

/// Product of two u128 values, which always fits in 256 bits
#[inline]
pub fn product(a: u128, b: u128) -> U256 {
    widen(a) * widen(b)
}

/// floor(a * b / denominator)
#[inline]
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128, AmmError> {
    if denominator == 0 {
        return Err(AmmError::InvalidReserves);
    }
    narrow(product(a, b) / widen(denominator))
}
