//! The market: sole owner of both token ledgers, the pair and the pool

use std::collections::BTreeSet;

use spotlend_amm::{LiquidityReceipt, ReservePair, SwapReceipt};
use spotlend_common::{Address, Asset, CoreError, CoreResult, Token, TokenInterface, TokenPair};
use spotlend_lending::{BorrowReceipt, Health, LendingPool, Position, RepayReceipt};
use spotlend_oracle::{spot_price, SpotPrice};

use crate::params::MarketParams;
use crate::unit::{AtomicUnit, Event, Op, Outcome, UnitError};

/// Address of the reserve pair
pub const PAIR: &str = "pair";
/// Address of the lending pool
pub const POOL: &str = "pool";
/// Account that seeds the pair at bootstrap
pub const DEPLOYER: &str = "deployer";

/// All state of one market
///
/// Every mutation goes through [`Market::execute`] or one of the single-op
/// wrappers, which run as one-op units. A unit that fails anywhere leaves the
/// market exactly as it found it, journal included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Market {
    token_a: Token,
    token_b: Token,
    pair: ReservePair,
    pool: LendingPool,
    events: Vec<Event>,
}

/// Everything a unit can touch except the journal, which only grows and is
/// rolled back by truncating it to `journal_len`
struct Snapshot {
    token_a: Token,
    token_b: Token,
    pair: ReservePair,
    pool: LendingPool,
    journal_len: usize,
}

// ============================================================================
// Bootstrap
// ============================================================================

impl Market {
    /// Create both tokens, seed the pair from the deployer, fund the pool and
    /// credit every participant
    pub fn new(params: &MarketParams) -> CoreResult<Self> {
        let pair = ReservePair::new(
            Address::new(PAIR),
            params.asset_a.decimals,
            params.asset_b.decimals,
        );
        let pool = LendingPool::new(
            Address::new(POOL),
            params.borrow_asset,
            params.collateral_factor_bps,
        )?;

        let mut market = Self {
            token_a: Token::new(params.asset_a.symbol.clone(), params.asset_a.decimals),
            token_b: Token::new(params.asset_b.symbol.clone(), params.asset_b.decimals),
            pair,
            pool,
            events: Vec::new(),
        };

        let deployer = Address::new(DEPLOYER);
        let pair_address = market.pair.address().clone();
        market.token_a.mint(&deployer, params.seed_a)?;
        market.token_b.mint(&deployer, params.seed_b)?;
        market.do_approve(&deployer, Asset::A, &pair_address, params.seed_a)?;
        market.do_approve(&deployer, Asset::B, &pair_address, params.seed_b)?;
        market.do_add_liquidity(
            &deployer,
            params.seed_a,
            params.seed_b,
            params.seed_a,
            params.seed_b,
        )?;

        let pool_address = market.pool.address().clone();
        market
            .token_mut(params.borrow_asset)
            .mint(&pool_address, params.pool_funding)?;

        for account in &params.accounts {
            let address = Address::new(account.name.as_str());
            market.token_a.mint(&address, account.balance_a)?;
            market.token_b.mint(&address, account.balance_b)?;
        }

        log::info!(
            "market up: {} {} / {} {} seeded, pool lends {} {} at {} bps",
            params.seed_a,
            market.token_a.symbol,
            params.seed_b,
            market.token_b.symbol,
            params.pool_funding,
            market.token(params.borrow_asset).symbol,
            params.collateral_factor_bps
        );
        Ok(market)
    }
}

// ============================================================================
// Read Access
// ============================================================================

impl Market {
    pub fn token(&self, asset: Asset) -> &Token {
        match asset {
            Asset::A => &self.token_a,
            Asset::B => &self.token_b,
        }
    }

    pub fn pair(&self) -> &ReservePair {
        &self.pair
    }

    pub fn pool(&self) -> &LendingPool {
        &self.pool
    }

    /// Journal of every applied op since bootstrap
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn balance_of(&self, asset: Asset, account: &Address) -> u128 {
        self.token(asset).balance_of(account)
    }

    /// Every address holding a non-zero balance of either asset
    pub fn holders(&self) -> BTreeSet<&Address> {
        self.token_a
            .holders()
            .chain(self.token_b.holders())
            .map(|(address, _)| address)
            .collect()
    }

    /// Instantaneous reserve-ratio price of `of` in `in_terms_of`
    pub fn spot_price(&self, of: Asset, in_terms_of: Asset) -> CoreResult<SpotPrice> {
        Ok(spot_price(&self.pair, of, in_terms_of)?)
    }

    /// Collateral a borrow of `amount` needs at current reserves
    pub fn deposit_required(&self, amount: u128) -> CoreResult<u128> {
        self.pool.calculate_deposit_required(&self.pair, amount)
    }

    pub fn position(&self, borrower: &Address) -> Option<Position> {
        self.pool.position(borrower)
    }

    pub fn health(&self, borrower: &Address) -> CoreResult<Option<Health>> {
        self.pool.health(&self.pair, borrower)
    }
}

// ============================================================================
// Atomic Execution
// ============================================================================

impl Market {
    /// Run every op of `unit` in order
    ///
    /// On the first failure the market is restored to its state before the
    /// unit and the failing op is reported; nothing after it runs.
    pub fn execute(&mut self, unit: &AtomicUnit) -> Result<Vec<Outcome>, UnitError> {
        let snapshot = self.snapshot();
        let mut outcomes = Vec::with_capacity(unit.len());

        for (index, op) in unit.ops().iter().enumerate() {
            match self.apply(op) {
                Ok(outcome) => outcomes.push(outcome),
                Err(source) => return Err(self.roll_back(snapshot, index, op.clone(), source)),
            }
        }

        log::debug!("unit of {} ops committed", unit.len());
        Ok(outcomes)
    }

    pub fn approve(
        &mut self,
        owner: &Address,
        asset: Asset,
        spender: &Address,
        amount: u128,
    ) -> Result<(), UnitError> {
        let op = Op::Approve {
            owner: owner.clone(),
            asset,
            spender: spender.clone(),
            amount,
        };
        self.atomically(op, |m| m.do_approve(owner, asset, spender, amount))
    }

    pub fn transfer(
        &mut self,
        asset: Asset,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), UnitError> {
        let op = Op::Transfer {
            asset,
            from: from.clone(),
            to: to.clone(),
            amount,
        };
        self.atomically(op, |m| m.do_transfer(asset, from, to, amount))
    }

    pub fn add_liquidity(
        &mut self,
        provider: &Address,
        amount_a: u128,
        amount_b: u128,
        min_a: u128,
        min_b: u128,
    ) -> Result<LiquidityReceipt, UnitError> {
        let op = Op::AddLiquidity {
            provider: provider.clone(),
            amount_a,
            amount_b,
            min_a,
            min_b,
        };
        self.atomically(op, |m| {
            m.do_add_liquidity(provider, amount_a, amount_b, min_a, min_b)
        })
    }

    pub fn remove_liquidity(
        &mut self,
        provider: &Address,
        shares: u128,
    ) -> Result<(u128, u128), UnitError> {
        let op = Op::RemoveLiquidity {
            provider: provider.clone(),
            shares,
        };
        self.atomically(op, |m| m.do_remove_liquidity(provider, shares))
    }

    pub fn swap(
        &mut self,
        trader: &Address,
        asset_in: Asset,
        amount_in: u128,
        min_out: u128,
    ) -> Result<SwapReceipt, UnitError> {
        let op = Op::Swap {
            trader: trader.clone(),
            asset_in,
            amount_in,
            min_out,
        };
        self.atomically(op, |m| m.do_swap(trader, asset_in, amount_in, min_out))
    }

    pub fn swap_exact_out(
        &mut self,
        trader: &Address,
        asset_in: Asset,
        amount_out: u128,
        max_in: u128,
    ) -> Result<SwapReceipt, UnitError> {
        let op = Op::SwapExactOut {
            trader: trader.clone(),
            asset_in,
            amount_out,
            max_in,
        };
        self.atomically(op, |m| {
            m.do_swap_exact_out(trader, asset_in, amount_out, max_in)
        })
    }

    pub fn borrow(&mut self, borrower: &Address, amount: u128) -> Result<BorrowReceipt, UnitError> {
        let op = Op::Borrow {
            borrower: borrower.clone(),
            amount,
        };
        self.atomically(op, |m| m.do_borrow(borrower, amount))
    }

    pub fn repay(&mut self, borrower: &Address, amount: u128) -> Result<RepayReceipt, UnitError> {
        let op = Op::Repay {
            borrower: borrower.clone(),
            amount,
        };
        self.atomically(op, |m| m.do_repay(borrower, amount))
    }

    /// Single-op unit with a typed result
    fn atomically<R>(
        &mut self,
        op: Op,
        f: impl FnOnce(&mut Self) -> CoreResult<R>,
    ) -> Result<R, UnitError> {
        let snapshot = self.snapshot();
        match f(self) {
            Ok(value) => Ok(value),
            Err(source) => Err(self.roll_back(snapshot, 0, op, source)),
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            token_a: self.token_a.clone(),
            token_b: self.token_b.clone(),
            pair: self.pair.clone(),
            pool: self.pool.clone(),
            journal_len: self.events.len(),
        }
    }

    fn roll_back(
        &mut self,
        snapshot: Snapshot,
        index: usize,
        op: Op,
        source: CoreError,
    ) -> UnitError {
        log::warn!(
            "unit rolled back at op {} ({}): {}",
            index,
            op.name(),
            source
        );
        self.token_a = snapshot.token_a;
        self.token_b = snapshot.token_b;
        self.pair = snapshot.pair;
        self.pool = snapshot.pool;
        self.events.truncate(snapshot.journal_len);
        UnitError { index, op, source }
    }

    fn apply(&mut self, op: &Op) -> CoreResult<Outcome> {
        Ok(match op {
            Op::Approve {
                owner,
                asset,
                spender,
                amount,
            } => {
                self.do_approve(owner, *asset, spender, *amount)?;
                Outcome::Approved
            }
            Op::Transfer {
                asset,
                from,
                to,
                amount,
            } => {
                self.do_transfer(*asset, from, to, *amount)?;
                Outcome::Transferred
            }
            Op::AddLiquidity {
                provider,
                amount_a,
                amount_b,
                min_a,
                min_b,
            } => Outcome::LiquidityAdded(self.do_add_liquidity(
                provider, *amount_a, *amount_b, *min_a, *min_b,
            )?),
            Op::RemoveLiquidity { provider, shares } => {
                let (amount_a, amount_b) = self.do_remove_liquidity(provider, *shares)?;
                Outcome::LiquidityRemoved { amount_a, amount_b }
            }
            Op::Swap {
                trader,
                asset_in,
                amount_in,
                min_out,
            } => Outcome::Swapped(self.do_swap(trader, *asset_in, *amount_in, *min_out)?),
            Op::SwapExactOut {
                trader,
                asset_in,
                amount_out,
                max_in,
            } => Outcome::Swapped(self.do_swap_exact_out(
                trader,
                *asset_in,
                *amount_out,
                *max_in,
            )?),
            Op::Borrow { borrower, amount } => {
                Outcome::Borrowed(self.do_borrow(borrower, *amount)?)
            }
            Op::Repay { borrower, amount } => Outcome::Repaid(self.do_repay(borrower, *amount)?),
        })
    }
}

// ============================================================================
// Op Handlers
// ============================================================================

impl Market {
    fn token_mut(&mut self, asset: Asset) -> &mut Token {
        match asset {
            Asset::A => &mut self.token_a,
            Asset::B => &mut self.token_b,
        }
    }

    fn do_approve(
        &mut self,
        owner: &Address,
        asset: Asset,
        spender: &Address,
        amount: u128,
    ) -> CoreResult<()> {
        self.token_mut(asset).approve(owner, spender, amount)?;
        self.events.push(Event::Approval {
            owner: owner.clone(),
            spender: spender.clone(),
            asset,
            amount,
        });
        Ok(())
    }

    fn do_transfer(
        &mut self,
        asset: Asset,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> CoreResult<()> {
        self.token_mut(asset).transfer(from, to, amount)?;
        self.events.push(Event::Transfer {
            asset,
            from: from.clone(),
            to: to.clone(),
            amount,
        });
        Ok(())
    }

    fn do_add_liquidity(
        &mut self,
        provider: &Address,
        amount_a: u128,
        amount_b: u128,
        min_a: u128,
        min_b: u128,
    ) -> CoreResult<LiquidityReceipt> {
        let mut tokens = TokenPair::new(&mut self.token_a, &mut self.token_b);
        let receipt = self
            .pair
            .add_liquidity(&mut tokens, provider, amount_a, amount_b, min_a, min_b)?;
        self.events.push(Event::LiquidityAdded {
            provider: provider.clone(),
            amount_a: receipt.amount_a,
            amount_b: receipt.amount_b,
            shares: receipt.shares,
        });
        Ok(receipt)
    }

    fn do_remove_liquidity(
        &mut self,
        provider: &Address,
        shares: u128,
    ) -> CoreResult<(u128, u128)> {
        let mut tokens = TokenPair::new(&mut self.token_a, &mut self.token_b);
        let (amount_a, amount_b) = self.pair.remove_liquidity(&mut tokens, provider, shares)?;
        self.events.push(Event::LiquidityRemoved {
            provider: provider.clone(),
            shares,
            amount_a,
            amount_b,
        });
        Ok((amount_a, amount_b))
    }

    fn do_swap(
        &mut self,
        trader: &Address,
        asset_in: Asset,
        amount_in: u128,
        min_out: u128,
    ) -> CoreResult<SwapReceipt> {
        let mut tokens = TokenPair::new(&mut self.token_a, &mut self.token_b);
        let receipt = self
            .pair
            .swap(&mut tokens, trader, asset_in, amount_in, min_out)?;
        self.record_swap(trader, receipt);
        Ok(receipt)
    }

    fn do_swap_exact_out(
        &mut self,
        trader: &Address,
        asset_in: Asset,
        amount_out: u128,
        max_in: u128,
    ) -> CoreResult<SwapReceipt> {
        let mut tokens = TokenPair::new(&mut self.token_a, &mut self.token_b);
        let receipt = self
            .pair
            .swap_exact_out(&mut tokens, trader, asset_in, amount_out, max_in)?;
        self.record_swap(trader, receipt);
        Ok(receipt)
    }

    fn record_swap(&mut self, trader: &Address, receipt: SwapReceipt) {
        self.events.push(Event::Swap {
            trader: trader.clone(),
            asset_in: receipt.asset_in,
            amount_in: receipt.amount_in,
            amount_out: receipt.amount_out,
        });
    }

    fn do_borrow(&mut self, borrower: &Address, amount: u128) -> CoreResult<BorrowReceipt> {
        let mut tokens = TokenPair::new(&mut self.token_a, &mut self.token_b);
        let receipt = self.pool.borrow(&self.pair, &mut tokens, borrower, amount)?;
        self.events.push(Event::Borrowed {
            borrower: borrower.clone(),
            amount,
            deposit: receipt.deposited,
        });
        Ok(receipt)
    }

    fn do_repay(&mut self, borrower: &Address, amount: u128) -> CoreResult<RepayReceipt> {
        let mut tokens = TokenPair::new(&mut self.token_a, &mut self.token_b);
        let receipt = self.pool.repay(&mut tokens, borrower, amount)?;
        self.events.push(Event::Repaid {
            borrower: borrower.clone(),
            amount,
            released: receipt.released,
        });
        Ok(receipt)
    }
}
