//! Error taxonomy shared by the pair, the oracle and the lending pool

use amm_model::AmmError;
use lending_model::LendingError;
use thiserror::Error;

use crate::TokenError;

pub type CoreResult<T> = Result<T, CoreError>;

/// Every failure aborts the whole atomic unit; the variant tells the caller
/// whether it hit liquidity exhaustion or a collateral shortfall
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    #[error("swap output rounds to zero")]
    InsufficientOutputAmount,

    #[error("deposit too small to mint liquidity shares")]
    InsufficientLiquidityMinted,

    #[error("withdrawal too small to return both assets")]
    InsufficientLiquidityBurned,

    #[error("provider holds {held} shares, {requested} requested")]
    InsufficientShares { requested: u128, held: u128 },

    #[error("minimum liquidity shares are locked")]
    LockedLiquidity,

    #[error("price moved beyond the caller's tolerance")]
    SlippageExceeded,

    #[error("constant product invariant violated")]
    InvariantViolated,

    #[error("pair reserves are empty")]
    EmptyReserves,

    #[error("collateral factor must exceed 1.0x (got {0} bps)")]
    InvalidCollateralFactor(u64),

    #[error("insufficient collateral: {required} required, {available} available")]
    InsufficientCollateral { required: u128, available: u128 },

    #[error("collateral transfer failed: {0}")]
    CollateralTransferFailed(#[source] TokenError),

    #[error("repayment transfer failed: {0}")]
    RepaymentTransferFailed(#[source] TokenError),

    #[error("repay of {requested} exceeds outstanding debt {outstanding}")]
    DebtExceeded { requested: u128, outstanding: u128 },

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    #[error("arithmetic underflow")]
    ArithmeticUnderflow,

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl From<AmmError> for CoreError {
    fn from(err: AmmError) -> Self {
        match err {
            AmmError::InvalidAmount => CoreError::InvalidAmount,
            AmmError::InvalidReserves | AmmError::InsufficientLiquidity => {
                CoreError::InsufficientLiquidity
            }
            AmmError::InsufficientOutputAmount => CoreError::InsufficientOutputAmount,
            AmmError::InsufficientLiquidityMinted => CoreError::InsufficientLiquidityMinted,
            AmmError::InsufficientLiquidityBurned => CoreError::InsufficientLiquidityBurned,
            AmmError::ExcessiveSlippage => CoreError::SlippageExceeded,
            AmmError::InvariantViolated => CoreError::InvariantViolated,
            AmmError::Overflow => CoreError::ArithmeticOverflow,
        }
    }
}

impl From<LendingError> for CoreError {
    fn from(err: LendingError) -> Self {
        match err {
            LendingError::ZeroAmount => CoreError::InvalidAmount,
            LendingError::InvalidCollateralFactor => CoreError::InvalidCollateralFactor(0),
            LendingError::EmptyReserves => CoreError::EmptyReserves,
            // The model has no amounts to report; callers that know them
            // construct the detailed variant themselves
            LendingError::DebtExceeded => CoreError::DebtExceeded {
                requested: 0,
                outstanding: 0,
            },
            LendingError::Overflow => CoreError::ArithmeticOverflow,
            LendingError::Underflow => CoreError::ArithmeticUnderflow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amm_errors_map_to_kinds() {
        assert_eq!(CoreError::from(AmmError::InvalidReserves), CoreError::InsufficientLiquidity);
        assert_eq!(CoreError::from(AmmError::Overflow), CoreError::ArithmeticOverflow);
        assert_eq!(CoreError::from(AmmError::ExcessiveSlippage), CoreError::SlippageExceeded);
    }

    #[test]
    fn test_lending_errors_map_to_kinds() {
        assert_eq!(CoreError::from(LendingError::ZeroAmount), CoreError::InvalidAmount);
        assert_eq!(CoreError::from(LendingError::Underflow), CoreError::ArithmeticUnderflow);
    }

    #[test]
    fn test_display_carries_amounts() {
        let err = CoreError::InsufficientCollateral { required: 30, available: 10 };
        assert_eq!(err.to_string(), "insufficient collateral: 30 required, 10 available");
    }
}
