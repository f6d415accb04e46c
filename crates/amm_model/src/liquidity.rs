//! Liquidity share math: seed mint, proportional mint, burn, optimal deposit

use alloy_primitives::U256;

use crate::math::quote;
use crate::wide::{mul_div, narrow, product};
use crate::{AmmError, MINIMUM_LIQUIDITY};

/// Integer square root (floor), Babylonian method
pub fn isqrt(y: U256) -> U256 {
    let three = U256::from(3u8);
    if y > three {
        let mut z = y;
        let mut x = y / U256::from(2u8) + U256::from(1u8);
        while x < z {
            z = x;
            x = (y / x + x) / U256::from(2u8);
        }
        z
    } else if y.is_zero() {
        U256::ZERO
    } else {
        U256::from(1u8)
    }
}

/// Shares minted to the provider on the very first deposit
///
/// shares = floor(sqrt(a · b)) - MINIMUM_LIQUIDITY
///
/// The caller is responsible for locking `MINIMUM_LIQUIDITY` additional
/// shares so that `total_shares = sqrt(a · b)`.
pub fn seed_shares(amount_a: u128, amount_b: u128) -> Result<u128, AmmError> {
    if amount_a == 0 || amount_b == 0 {
        return Err(AmmError::InvalidAmount);
    }
    let root = narrow(isqrt(product(amount_a, amount_b)))?;
    if root <= MINIMUM_LIQUIDITY {
        return Err(AmmError::InsufficientLiquidityMinted);
    }
    Ok(root - MINIMUM_LIQUIDITY)
}

/// Shares minted for a deposit into a funded pool
///
/// shares = min(a · total / reserve_a, b · total / reserve_b)
///
/// Taking the minimum means any amount beyond the pool ratio is donated, which
/// is why the pair only ever pulls the amounts chosen by [`optimal_deposit`].
pub fn mint_shares(
    amount_a: u128,
    amount_b: u128,
    reserve_a: u128,
    reserve_b: u128,
    total_shares: u128,
) -> Result<u128, AmmError> {
    if amount_a == 0 || amount_b == 0 {
        return Err(AmmError::InvalidAmount);
    }
    if reserve_a == 0 || reserve_b == 0 || total_shares == 0 {
        return Err(AmmError::InvalidReserves);
    }
    let by_a = mul_div(amount_a, total_shares, reserve_a)?;
    let by_b = mul_div(amount_b, total_shares, reserve_b)?;
    let shares = by_a.min(by_b);
    if shares == 0 {
        return Err(AmmError::InsufficientLiquidityMinted);
    }
    Ok(shares)
}

/// Amounts returned for burning `shares`
///
/// amount_x = shares · reserve_x / total (floor on both sides)
pub fn burn_amounts(
    shares: u128,
    reserve_a: u128,
    reserve_b: u128,
    total_shares: u128,
) -> Result<(u128, u128), AmmError> {
    if shares == 0 {
        return Err(AmmError::InvalidAmount);
    }
    if shares > total_shares {
        return Err(AmmError::InsufficientLiquidity);
    }
    let amount_a = mul_div(shares, reserve_a, total_shares)?;
    let amount_b = mul_div(shares, reserve_b, total_shares)?;
    if amount_a == 0 || amount_b == 0 {
        return Err(AmmError::InsufficientLiquidityBurned);
    }
    Ok((amount_a, amount_b))
}

/// Pick the deposit that matches the pool ratio without exceeding either
/// desired amount
///
/// The unused remainder of one side is simply never pulled from the
/// provider. Fails with `ExcessiveSlippage` when the matched amount on
/// either side falls below the provider's minimum.
pub fn optimal_deposit(
    desired_a: u128,
    desired_b: u128,
    min_a: u128,
    min_b: u128,
    reserve_a: u128,
    reserve_b: u128,
) -> Result<(u128, u128), AmmError> {
    if desired_a == 0 || desired_b == 0 {
        return Err(AmmError::InvalidAmount);
    }
    if reserve_a == 0 && reserve_b == 0 {
        return Ok((desired_a, desired_b));
    }

    let b_optimal = quote(desired_a, reserve_a, reserve_b)?;
    if b_optimal <= desired_b {
        if b_optimal < min_b {
            return Err(AmmError::ExcessiveSlippage);
        }
        return Ok((desired_a, b_optimal));
    }

    let a_optimal = quote(desired_b, reserve_b, reserve_a)?;
    debug_assert!(a_optimal <= desired_a);
    if a_optimal < min_a {
        return Err(AmmError::ExcessiveSlippage);
    }
    Ok((a_optimal, desired_b))
}
