//! Constant product swap math (x·y=k) with the fee taken on the input side

use crate::wide::{mul_div, narrow, product, widen};
use crate::{AmmError, BPS_SCALE, FEE_BPS};

/// Swap quote with the reserves the pair should hold afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapQuote {
    /// Amount the trader pays into the pool
    pub amount_in: u128,

    /// Amount the trader receives
    pub amount_out: u128,

    /// Input-side reserve after the trade
    pub new_reserve_in: u128,

    /// Output-side reserve after the trade
    pub new_reserve_out: u128,
}

/// Output for an exact input amount
///
/// With fee on input:
/// - Δin_net = Δin · (BPS_SCALE - FEE_BPS) / BPS_SCALE
/// - Δout = Δin_net · y0 / (x0 + Δin_net)
///
/// Evaluated as a single floor division so the pool never pays out more than
/// the curve allows.
///
/// # Errors
/// * `InvalidAmount` if `amount_in` is zero
/// * `InvalidReserves` if either reserve is empty
/// * `InsufficientOutputAmount` if the output rounds to zero
/// * `InsufficientLiquidity` if the output would consume the whole reserve
pub fn get_amount_out(
    amount_in: u128,
    reserve_in: u128,
    reserve_out: u128,
) -> Result<u128, AmmError> {
    if amount_in == 0 {
        return Err(AmmError::InvalidAmount);
    }
    if reserve_in == 0 || reserve_out == 0 {
        return Err(AmmError::InvalidReserves);
    }

    let in_with_fee = product(amount_in, BPS_SCALE - FEE_BPS);
    let numerator = in_with_fee * widen(reserve_out);
    let denominator = product(reserve_in, BPS_SCALE) + in_with_fee;

    let amount_out = narrow(numerator / denominator)?;
    if amount_out == 0 {
        return Err(AmmError::InsufficientOutputAmount);
    }
    if amount_out >= reserve_out {
        return Err(AmmError::InsufficientLiquidity);
    }
    Ok(amount_out)
}

/// Input required to receive an exact output amount
///
/// Δin = x0 · Δout · BPS_SCALE / ((y0 - Δout) · (BPS_SCALE - FEE_BPS)) + 1
///
/// The trailing `+ 1` rounds in the pool's favour.
pub fn get_amount_in(
    amount_out: u128,
    reserve_in: u128,
    reserve_out: u128,
) -> Result<u128, AmmError> {
    if amount_out == 0 {
        return Err(AmmError::InvalidAmount);
    }
    if reserve_in == 0 || reserve_out == 0 {
        return Err(AmmError::InvalidReserves);
    }
    if amount_out >= reserve_out {
        return Err(AmmError::InsufficientLiquidity);
    }

    let numerator = product(reserve_in, amount_out) * widen(BPS_SCALE);
    let denominator = product(reserve_out - amount_out, BPS_SCALE - FEE_BPS);

    narrow(numerator / denominator)?
        .checked_add(1)
        .ok_or(AmmError::Overflow)
}

/// Full quote for selling `amount_in` into the pool
pub fn quote_exact_in(
    reserve_in: u128,
    reserve_out: u128,
    amount_in: u128,
) -> Result<SwapQuote, AmmError> {
    let amount_out = get_amount_out(amount_in, reserve_in, reserve_out)?;
    let new_reserve_in = reserve_in.checked_add(amount_in).ok_or(AmmError::Overflow)?;
    let new_reserve_out = reserve_out - amount_out;

    check_invariant(reserve_in, reserve_out, new_reserve_in, new_reserve_out)?;

    Ok(SwapQuote {
        amount_in,
        amount_out,
        new_reserve_in,
        new_reserve_out,
    })
}

/// Full quote for buying exactly `amount_out` from the pool
pub fn quote_exact_out(
    reserve_in: u128,
    reserve_out: u128,
    amount_out: u128,
) -> Result<SwapQuote, AmmError> {
    let amount_in = get_amount_in(amount_out, reserve_in, reserve_out)?;
    let new_reserve_in = reserve_in.checked_add(amount_in).ok_or(AmmError::Overflow)?;
    let new_reserve_out = reserve_out - amount_out;

    check_invariant(reserve_in, reserve_out, new_reserve_in, new_reserve_out)?;

    Ok(SwapQuote {
        amount_in,
        amount_out,
        new_reserve_in,
        new_reserve_out,
    })
}

/// Require x1·y1 > x0·y0
///
/// The fee leaves part of every input in the pool, so a swap that does not
/// strictly grow k has been mispriced.
pub fn check_invariant(
    reserve_in: u128,
    reserve_out: u128,
    new_reserve_in: u128,
    new_reserve_out: u128,
) -> Result<(), AmmError> {
    let k0 = product(reserve_in, reserve_out);
    let k1 = product(new_reserve_in, new_reserve_out);
    if k1 > k0 {
        Ok(())
    } else {
        Err(AmmError::InvariantViolated)
    }
}

/// Equivalent amount of the other asset at the current reserve ratio, no fee
///
/// quote = amount_a · reserve_b / reserve_a (floor)
pub fn quote(amount_a: u128, reserve_a: u128, reserve_b: u128) -> Result<u128, AmmError> {
    if amount_a == 0 {
        return Err(AmmError::InvalidAmount);
    }
    if reserve_a == 0 || reserve_b == 0 {
        return Err(AmmError::InvalidReserves);
    }
    mul_div(amount_a, reserve_b, reserve_a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const E18: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn test_amount_out_small() {
        // 100 tokens : 10 WETH, sell 1 token
        let out = get_amount_out(E18, 100 * E18, 10 * E18).unwrap();

        // Spot would give 0.1 WETH; fee and slippage give less
        assert!(out < E18 / 10);
        assert!(out > E18 / 10 * 98 / 100);
    }

    #[test]
    fn test_amount_out_matches_v2_formula() {
        let out = get_amount_out(1_000, 5_000, 10_000).unwrap();
        // 1000*997*10000 / (5000*1000 + 1000*997) = 9_970_000_000 / 5_997_000
        assert_eq!(out, 1662);
    }

    #[test]
    fn test_tiny_input_rounds_to_zero_and_fails() {
        let result = get_amount_out(1, 100 * E18, 10 * E18);
        assert_eq!(result, Err(AmmError::InsufficientOutputAmount));
    }

    #[test]
    fn test_empty_pool_rejected() {
        assert_eq!(get_amount_out(E18, 0, 10 * E18), Err(AmmError::InvalidReserves));
        assert_eq!(get_amount_in(1, 10, 0), Err(AmmError::InvalidReserves));
    }

    #[test]
    fn test_exact_out_cannot_drain() {
        let result = get_amount_in(10 * E18, 100 * E18, 10 * E18);
        assert_eq!(result, Err(AmmError::InsufficientLiquidity));
    }

    #[test]
    fn test_exact_out_pays_at_least_exact_in() {
        let reserve_in = 100 * E18;
        let reserve_out = 10 * E18;
        let want = E18;

        let amount_in = get_amount_in(want, reserve_in, reserve_out).unwrap();
        let got = get_amount_out(amount_in, reserve_in, reserve_out).unwrap();
        assert!(got >= want);
    }

    #[test]
    fn test_invariant_increases_with_fees() {
        let q = quote_exact_in(100 * E18, 10 * E18, 10_000 * E18).unwrap();
        let k0 = product(100 * E18, 10 * E18);
        let k1 = product(q.new_reserve_in, q.new_reserve_out);
        assert!(k1 > k0, "Invariant should increase due to fees");
    }

    #[test]
    fn test_round_trip_loses_to_fees() {
        let x = 100 * E18;
        let y = 10 * E18;

        let sell = quote_exact_in(x, y, 5 * E18).unwrap();
        let back =
            quote_exact_in(sell.new_reserve_out, sell.new_reserve_in, sell.amount_out).unwrap();

        assert!(back.amount_out < 5 * E18, "Round-trip should lose to fees");
    }

    #[test]
    fn test_quote_ratio() {
        assert_eq!(quote(E18, 100 * E18, 10 * E18).unwrap(), E18 / 10);
        assert_eq!(quote(0, 1, 1), Err(AmmError::InvalidAmount));
    }

    proptest! {
        #[test]
        fn prop_swap_never_decreases_k(
            x in 1_000u128..=1_000_000_000 * E18,
            y in 1_000u128..=1_000_000_000 * E18,
            dx in 1u128..=1_000_000_000 * E18,
        ) {
            if let Ok(q) = quote_exact_in(x, y, dx) {
                prop_assert!(product(q.new_reserve_in, q.new_reserve_out) > product(x, y));
                prop_assert!(q.new_reserve_out > 0);
            }
        }

        #[test]
        fn prop_larger_input_never_pays_less(
            x in 1_000u128..=1_000_000 * E18,
            y in 1_000u128..=1_000_000 * E18,
            dx in 1u128..=1_000_000 * E18,
            extra in 1u128..=1_000_000 * E18,
        ) {
            let small = get_amount_out(dx, x, y);
            let large = get_amount_out(dx + extra, x, y);
            if let (Ok(small), Ok(large)) = (small, large) {
                prop_assert!(large >= small);
            }
        }
    }
}
