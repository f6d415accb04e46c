//! AMM Model - Pure constant product math (x·y=k) for the reserve pair
//!
//! This crate contains the Uniswap-V2 style constant product formulas used by
//! `programs/amm`, kept free of state and I/O so the Kani harnesses in
//! `crates/proofs/kani` and the property tests exercise exactly the code the
//! pair runs.
//!
//! All amounts are raw base units (`u128`). Intermediate products are taken
//! in 256-bit so `reserve * reserve` never wraps.

#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

pub mod liquidity;
pub mod math;
pub mod wide;

pub use alloy_primitives::U256;
pub use liquidity::{burn_amounts, isqrt, mint_shares, optimal_deposit, seed_shares};
pub use math::{
    check_invariant, get_amount_in, get_amount_out, quote, quote_exact_in, quote_exact_out,
    SwapQuote,
};

/// Swap fee in basis points (0.3%, i.e. effective input = amount_in * 997 / 1000)
pub const FEE_BPS: u128 = 30;

/// Basis points scale (10,000 bps = 100%)
pub const BPS_SCALE: u128 = 10_000;

/// Shares locked forever on the first deposit so the pool can never be
/// fully drained back to zero reserves
pub const MINIMUM_LIQUIDITY: u128 = 1_000;

/// Error types for AMM operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmmError {
    /// Invalid reserves (zero on a side that must be funded)
    InvalidReserves,
    /// Invalid amount (zero)
    InvalidAmount,
    /// Requested output meets or exceeds the available reserve
    InsufficientLiquidity,
    /// Output rounded down to zero
    InsufficientOutputAmount,
    /// Deposit would mint zero shares
    InsufficientLiquidityMinted,
    /// Withdrawal would return zero of an asset
    InsufficientLiquidityBurned,
    /// Optimal deposit fell below the caller's minimum
    ExcessiveSlippage,
    /// x·y decreased across a swap
    InvariantViolated,
    /// Arithmetic overflow
    Overflow,
}
