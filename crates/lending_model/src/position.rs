//! Borrow position transitions
//!
//! Closed (debt = 0) --borrow--> Open (debt > 0) --repay(full)--> Closed.
//! A partial repay stays Open with proportionally reduced collateral.

use alloy_primitives::U256;

use crate::LendingError;

/// Per-borrower debt and posted collateral, in raw base units of each asset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    /// Outstanding borrow-asset debt
    pub debt: u128,
    /// Collateral-asset units held by the pool for this borrower
    pub collateral: u128,
}

/// Result of a repay transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepayOutcome {
    /// Position after the repay
    pub position: Position,
    /// Collateral handed back to the borrower
    pub released: u128,
}

impl Position {
    /// A position with no debt and no collateral
    pub const CLOSED: Position = Position { debt: 0, collateral: 0 };

    /// Check if the position is closed (L4)
    pub fn is_closed(&self) -> bool {
        self.debt == 0 && self.collateral == 0
    }
}

/// Add a new draw of `amount` backed by `required` collateral
///
/// `required` comes from [`crate::deposit_required`] at the moment of the
/// borrow; this transition does not re-price existing debt.
pub fn apply_borrow(
    position: Position,
    amount: u128,
    required: u128,
) -> Result<Position, LendingError> {
    if amount == 0 || required == 0 {
        return Err(LendingError::ZeroAmount);
    }

    let debt = position.debt.checked_add(amount).ok_or(LendingError::Overflow)?;
    let collateral = position
        .collateral
        .checked_add(required)
        .ok_or(LendingError::Overflow)?;

    Ok(Position { debt, collateral })
}

/// Collateral unlocked by repaying `amount`
///
/// released = collateral · amount / debt (floor), and exactly `collateral`
/// when the whole debt is repaid so no dust is left behind (L3).
pub fn collateral_release(position: Position, amount: u128) -> Result<u128, LendingError> {
    if amount == 0 {
        return Err(LendingError::ZeroAmount);
    }
    if amount > position.debt {
        return Err(LendingError::DebtExceeded);
    }
    if amount == position.debt {
        return Ok(position.collateral);
    }

    let released = U256::from(position.collateral) * U256::from(amount) / U256::from(position.debt);

    // released <= collateral because amount < debt
    u128::try_from(released).map_err(|_| LendingError::Overflow)
}

/// Repay `amount` of debt and release the matching share of collateral
pub fn apply_repay(position: Position, amount: u128) -> Result<RepayOutcome, LendingError> {
    let released = collateral_release(position, amount)?;

    let debt = position.debt.checked_sub(amount).ok_or(LendingError::Underflow)?;
    let collateral = position
        .collateral
        .checked_sub(released)
        .ok_or(LendingError::Underflow)?;

    Ok(RepayOutcome {
        position: Position { debt, collateral },
        released,
    })
}
