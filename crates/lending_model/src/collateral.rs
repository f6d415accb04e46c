//! Collateral requirement priced off instantaneous pair reserves

use alloy_primitives::U256;

use crate::{LendingError, BPS_SCALE};

/// Collateral that must be posted to borrow `amount`
///
/// # Formula
/// required = ceil(amount · reserve_collateral · factor_bps / (reserve_borrow · BPS_SCALE))
///
/// i.e. `amount × spot(borrow in collateral) × factor`. Amounts are raw base
/// units of each asset, so the decimal scales of the two assets cancel
/// through the reserve ratio.
///
/// Rounds up: the borrower covers any fractional base unit.
///
/// # Properties
/// - **L1**: Monotone non-decreasing in `amount` and in
///   `reserve_collateral / reserve_borrow`
/// - **L2**: `required · reserve_borrow · BPS_SCALE >=
///   amount · reserve_collateral · factor_bps`
/// - Linear up to rounding: `n · f(x) - f(n · x) < n`
pub fn deposit_required(
    amount: u128,
    reserve_borrow: u128,
    reserve_collateral: u128,
    collateral_factor_bps: u64,
) -> Result<u128, LendingError> {
    if amount == 0 {
        return Err(LendingError::ZeroAmount);
    }
    if (collateral_factor_bps as u128) <= BPS_SCALE {
        return Err(LendingError::InvalidCollateralFactor);
    }
    if reserve_borrow == 0 || reserve_collateral == 0 {
        return Err(LendingError::EmptyReserves);
    }

    let numerator = U256::from(amount)
        .checked_mul(U256::from(reserve_collateral))
        .and_then(|v| v.checked_mul(U256::from(collateral_factor_bps)))
        .ok_or(LendingError::Overflow)?;
    let denominator = U256::from(reserve_borrow) * U256::from(BPS_SCALE);

    let mut required = numerator / denominator;
    if !(numerator % denominator).is_zero() {
        required += U256::from(1u8);
    }

    u128::try_from(required).map_err(|_| LendingError::Overflow)
}

/// Posted collateral relative to what the same debt would require right now
///
/// Returns bps (10,000 = exactly covered). A value below 10,000 means the
/// position is under-collateralized at the current spot price; nothing in
/// this model acts on it.
pub fn collateral_ratio_bps(collateral: u128, required_now: u128) -> Result<u128, LendingError> {
    if required_now == 0 {
        return Err(LendingError::ZeroAmount);
    }
    let ratio = U256::from(collateral) * U256::from(BPS_SCALE) / U256::from(required_now);
    u128::try_from(ratio).map_err(|_| LendingError::Overflow)
}
