//! Lending Model - Pure collateral and borrow-position math
//!
//! No state, no token movement, no unwrap/panic: every function is total and
//! returns a `LendingError` instead. `programs/lending` runs these functions
//! against its ledger, and the Kani harnesses in `crates/proofs/kani` check
//! them directly.
//!
//! # Properties
//! - **L1**: Requirement is monotone in borrow amount and in price
//! - **L2**: Requirement rounds up, never below the exact product
//! - **L3**: Full repay releases exactly the posted collateral
//! - **L4**: A closed position has zero debt and zero collateral

#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

pub mod collateral;
pub mod position;

#[cfg(test)]
mod negative_tests;

pub use collateral::{collateral_ratio_bps, deposit_required};
pub use position::{apply_borrow, apply_repay, collateral_release, Position, RepayOutcome};

/// Basis points scale (10,000 bps = 1.0x)
pub const BPS_SCALE: u128 = 10_000;

/// Error types for lending model operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LendingError {
    /// Amount is zero
    ZeroAmount,
    /// Collateral factor does not over-collateralize (<= 1.0x)
    InvalidCollateralFactor,
    /// Oracle reserves are empty
    EmptyReserves,
    /// Repay amount exceeds outstanding debt
    DebtExceeded,
    /// Arithmetic overflow
    Overflow,
    /// Arithmetic underflow
    Underflow,
}
