//! Borrow ledger priced off the pair's spot reserves

use lending_model::{self, LendingError, Position};
use serde::Serialize;
use spotlend_common::{Address, Asset, CoreError, CoreResult, TokenInterface, TokenPair};
use spotlend_oracle::ReserveSource;
use std::collections::BTreeMap;

/// Result of a successful borrow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BorrowReceipt {
    /// Borrow-asset units sent to the borrower
    pub borrowed: u128,
    /// Collateral-asset units pulled into the pool
    pub deposited: u128,
}

/// Result of a successful repay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RepayReceipt {
    pub repaid: u128,
    /// Collateral handed back
    pub released: u128,
    /// True when the repay closed the position
    pub closed: bool,
}

/// Position viewed against the current spot requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Health {
    pub debt: u128,
    pub collateral: u128,
    /// Collateral the same debt would need at today's reserves
    pub required_now: u128,
    /// `collateral / required_now` in bps; below 10,000 is under-collateralized
    pub ratio_bps: u128,
}

/// Over-collateralized lending pool for one borrow asset against the other
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LendingPool {
    address: Address,
    borrow_asset: Asset,
    collateral_asset: Asset,
    collateral_factor_bps: u64,
    positions: BTreeMap<Address, Position>,
}

impl LendingPool {
    /// Pool lending `borrow_asset` against the other side of the pair
    ///
    /// The factor must over-collateralize: more than 10,000 bps (1.0x).
    pub fn new(
        address: Address,
        borrow_asset: Asset,
        collateral_factor_bps: u64,
    ) -> CoreResult<Self> {
        if u128::from(collateral_factor_bps) <= lending_model::BPS_SCALE {
            return Err(CoreError::InvalidCollateralFactor(collateral_factor_bps));
        }
        Ok(Self {
            address,
            borrow_asset,
            collateral_asset: borrow_asset.other(),
            collateral_factor_bps,
            positions: BTreeMap::new(),
        })
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn borrow_asset(&self) -> Asset {
        self.borrow_asset
    }

    pub fn collateral_asset(&self) -> Asset {
        self.collateral_asset
    }

    pub fn collateral_factor_bps(&self) -> u64 {
        self.collateral_factor_bps
    }

    /// The pool's own balance of the borrow asset
    pub fn reserve_of_borrow_asset<T: TokenInterface>(&self, borrow_token: &T) -> u128 {
        borrow_token.balance_of(&self.address)
    }

    /// Open position of `borrower`, if any
    pub fn position(&self, borrower: &Address) -> Option<Position> {
        self.positions.get(borrower).copied()
    }

    pub fn positions(&self) -> impl Iterator<Item = (&Address, &Position)> {
        self.positions.iter()
    }

    pub fn total_debt(&self) -> u128 {
        self.positions.values().map(|p| p.debt).sum()
    }

    pub fn total_collateral(&self) -> u128 {
        self.positions.values().map(|p| p.collateral).sum()
    }

    /// Collateral needed to borrow `amount` at the source's current reserves
    ///
    /// amount × spot(borrow in collateral) × factor, rounded up.
    pub fn calculate_deposit_required<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        amount: u128,
    ) -> CoreResult<u128> {
        let reserve_borrow = source.reserve(self.borrow_asset);
        let reserve_collateral = source.reserve(self.collateral_asset);

        let required = lending_model::deposit_required(
            amount,
            reserve_borrow,
            reserve_collateral,
            self.collateral_factor_bps,
        )
        .map_err(|err| self.lending_error(err))?;

        log::debug!(
            "pool {}: {} {} requires {} {} (reserves {} / {})",
            self.address,
            amount,
            self.borrow_asset,
            required,
            self.collateral_asset,
            reserve_borrow,
            reserve_collateral
        );
        Ok(required)
    }

    /// Borrow `amount` of the borrow asset against freshly posted collateral
    ///
    /// The borrower must have approved the pool for the collateral. Nothing
    /// changes unless the whole borrow goes through.
    pub fn borrow<S, T>(
        &mut self,
        source: &S,
        tokens: &mut TokenPair<'_, T>,
        borrower: &Address,
        amount: u128,
    ) -> CoreResult<BorrowReceipt>
    where
        S: ReserveSource + ?Sized,
        T: TokenInterface,
    {
        if amount == 0 {
            return Err(CoreError::InvalidAmount);
        }
        if self.reserve_of_borrow_asset(tokens.get(self.borrow_asset)) < amount {
            return Err(CoreError::InsufficientLiquidity);
        }

        let required = self.calculate_deposit_required(source, amount)?;
        let available = tokens.get(self.collateral_asset).balance_of(borrower);
        if available < required {
            return Err(CoreError::InsufficientCollateral {
                required,
                available,
            });
        }

        let previous = self.position(borrower).unwrap_or_default();
        let updated = lending_model::apply_borrow(previous, amount, required)
            .map_err(|err| self.lending_error(err))?;

        tokens
            .get_mut(self.collateral_asset)
            .transfer_from(&self.address, borrower, &self.address, required)
            .map_err(CoreError::CollateralTransferFailed)?;

        self.positions.insert(borrower.clone(), updated);

        if let Err(err) = tokens
            .get_mut(self.borrow_asset)
            .transfer(&self.address, borrower, amount)
        {
            self.restore(borrower, previous);
            tokens
                .get_mut(self.collateral_asset)
                .transfer(&self.address, borrower, required)?;
            return Err(err.into());
        }

        log::info!(
            "pool {}: {} borrowed {} {} against {} {} (debt {}, collateral {})",
            self.address,
            borrower,
            amount,
            self.borrow_asset,
            required,
            self.collateral_asset,
            updated.debt,
            updated.collateral
        );

        Ok(BorrowReceipt {
            borrowed: amount,
            deposited: required,
        })
    }

    /// Repay `amount` of debt and take back the matching share of collateral
    ///
    /// The borrower must have approved the pool for the repayment.
    pub fn repay<T: TokenInterface>(
        &mut self,
        tokens: &mut TokenPair<'_, T>,
        borrower: &Address,
        amount: u128,
    ) -> CoreResult<RepayReceipt> {
        if amount == 0 {
            return Err(CoreError::InvalidAmount);
        }
        let previous = self.position(borrower).unwrap_or_default();
        if amount > previous.debt {
            return Err(CoreError::DebtExceeded {
                requested: amount,
                outstanding: previous.debt,
            });
        }

        let outcome = lending_model::apply_repay(previous, amount)
            .map_err(|err| self.lending_error(err))?;

        tokens
            .get_mut(self.borrow_asset)
            .transfer_from(&self.address, borrower, &self.address, amount)
            .map_err(CoreError::RepaymentTransferFailed)?;

        self.restore(borrower, outcome.position);

        if outcome.released > 0 {
            if let Err(err) = tokens.get_mut(self.collateral_asset).transfer(
                &self.address,
                borrower,
                outcome.released,
            ) {
                self.restore(borrower, previous);
                tokens
                    .get_mut(self.borrow_asset)
                    .transfer(&self.address, borrower, amount)?;
                return Err(err.into());
            }
        }

        let closed = outcome.position.is_closed();
        log::info!(
            "pool {}: {} repaid {} {}, released {} {}{}",
            self.address,
            borrower,
            amount,
            self.borrow_asset,
            outcome.released,
            self.collateral_asset,
            if closed { " (closed)" } else { "" }
        );

        Ok(RepayReceipt {
            repaid: amount,
            released: outcome.released,
            closed,
        })
    }

    /// Collateral ratio of `borrower`'s position at the source's current reserves
    pub fn health<S: ReserveSource + ?Sized>(
        &self,
        source: &S,
        borrower: &Address,
    ) -> CoreResult<Option<Health>> {
        let Some(position) = self.position(borrower) else {
            return Ok(None);
        };
        let required_now = self.calculate_deposit_required(source, position.debt)?;
        let ratio_bps = lending_model::collateral_ratio_bps(position.collateral, required_now)
            .map_err(|err| self.lending_error(err))?;

        Ok(Some(Health {
            debt: position.debt,
            collateral: position.collateral,
            required_now,
            ratio_bps,
        }))
    }

    /// Write `position` back, dropping closed ones from the ledger
    fn restore(&mut self, borrower: &Address, position: Position) {
        if position.is_closed() {
            self.positions.remove(borrower);
        } else {
            self.positions.insert(borrower.clone(), position);
        }
    }

    fn lending_error(&self, err: LendingError) -> CoreError {
        match err {
            LendingError::InvalidCollateralFactor => {
                CoreError::InvalidCollateralFactor(self.collateral_factor_bps)
            }
            other => other.into(),
        }
    }
}
