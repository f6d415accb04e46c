//! Negative tests: invalid inputs are rejected without producing a position
//!
//! These tests ensure that:
//! - Zero amounts and non over-collateralizing factors are refused
//! - Repays beyond the outstanding debt are refused
//! - Overflowing inputs return errors instead of wrapping

use crate::*;

const E18: u128 = 1_000_000_000_000_000_000;

// ========================================================================
// N1: Zero and degenerate inputs
// ========================================================================

#[test]
fn n1_zero_borrow_rejected() {
    assert_eq!(deposit_required(0, 100 * E18, 10 * E18, 30_000), Err(LendingError::ZeroAmount));
    assert_eq!(apply_borrow(Position::CLOSED, 0, 1), Err(LendingError::ZeroAmount));
}

#[test]
fn n1_zero_collateral_borrow_rejected() {
    // A borrow that somehow priced to zero collateral must not open a position
    assert_eq!(apply_borrow(Position::CLOSED, 1, 0), Err(LendingError::ZeroAmount));
}

#[test]
fn n1_zero_repay_rejected() {
    let open = Position { debt: 10, collateral: 3 };
    assert_eq!(apply_repay(open, 0), Err(LendingError::ZeroAmount));
}

// ========================================================================
// N2: Closed positions
// ========================================================================

#[test]
fn n2_repay_on_closed_position() {
    assert_eq!(apply_repay(Position::CLOSED, 1), Err(LendingError::DebtExceeded));
}

#[test]
fn n2_default_is_closed() {
    assert!(Position::default().is_closed());
}

// ========================================================================
// N3: Parameter bounds
// ========================================================================

#[test]
fn n3_factor_exactly_one_rejected() {
    assert_eq!(
        deposit_required(E18, 100 * E18, 10 * E18, BPS_SCALE as u64),
        Err(LendingError::InvalidCollateralFactor)
    );
}

#[test]
fn n3_requirement_overflow_reported() {
    // u128::MAX² · factor does not fit in 256 bits
    assert_eq!(
        deposit_required(u128::MAX, 1, u128::MAX, 30_000),
        Err(LendingError::Overflow)
    );
}

#[test]
fn n3_ratio_of_zero_requirement_rejected() {
    assert_eq!(collateral_ratio_bps(1, 0), Err(LendingError::ZeroAmount));
}
