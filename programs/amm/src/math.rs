//! Constant product AMM math (x·y=k) - imported from amm_model
//!
//! The pair never re-derives curve math locally; everything goes through the
//! same functions the Kani harnesses check.

pub use amm_model::{
    self, burn_amounts, check_invariant, mint_shares, optimal_deposit, quote_exact_in,
    quote_exact_out, seed_shares, wide, AmmError, SwapQuote, BPS_SCALE, FEE_BPS,
    MINIMUM_LIQUIDITY, U256,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_matches_997_over_1000() {
        // The bps form and the canonical 997/1000 form agree on every input
        for amount_in in [10u128.pow(10), 123_456_789_000, 10u128.pow(18)] {
            let (x, y) = (5 * 10u128.pow(20), 7 * 10u128.pow(16));
            let ours = quote_exact_in(x, y, amount_in).unwrap().amount_out;
            let canonical = amount_in * 997 * y / (x * 1000 + amount_in * 997);
            assert_eq!(ours, canonical);
        }
    }

    #[test]
    fn test_fee_is_thirty_bps() {
        assert_eq!(BPS_SCALE - FEE_BPS, 9_970);
    }
}
