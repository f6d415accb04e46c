//! Reserve pair state and its liquidity / swap operations
//!
//! Every operation validates and prices first, then pulls tokens in, then
//! updates reserves and shares, then pays out. A failure at any step before
//! the payout leaves the pair and both ledgers untouched.

use serde::Serialize;
use spotlend_common::{Address, Asset, CoreError, CoreResult, TokenInterface, TokenPair};
use std::collections::BTreeMap;

use crate::math::{self, wide, SwapQuote, MINIMUM_LIQUIDITY, U256};

/// Outcome of a liquidity deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LiquidityReceipt {
    /// Amount of A actually pulled
    pub amount_a: u128,
    /// Amount of B actually pulled
    pub amount_b: u128,
    /// Shares minted to the provider
    pub shares: u128,
}

/// Outcome of a swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwapReceipt {
    pub asset_in: Asset,
    pub amount_in: u128,
    pub amount_out: u128,
}

/// Two-asset constant product pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservePair {
    address: Address,
    decimals_a: u8,
    decimals_b: u8,
    reserve_a: u128,
    reserve_b: u128,
    total_shares: u128,
    shares: BTreeMap<Address, u128>,
}

impl ReservePair {
    /// Empty pair; the first `add_liquidity` seeds it
    pub fn new(address: Address, decimals_a: u8, decimals_b: u8) -> Self {
        Self {
            address,
            decimals_a,
            decimals_b,
            reserve_a: 0,
            reserve_b: 0,
            total_shares: 0,
            shares: BTreeMap::new(),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Current (reserve_a, reserve_b) in raw units
    pub fn get_reserves(&self) -> (u128, u128) {
        (self.reserve_a, self.reserve_b)
    }

    pub fn reserve(&self, asset: Asset) -> u128 {
        match asset {
            Asset::A => self.reserve_a,
            Asset::B => self.reserve_b,
        }
    }

    pub fn decimals(&self, asset: Asset) -> u8 {
        match asset {
            Asset::A => self.decimals_a,
            Asset::B => self.decimals_b,
        }
    }

    pub fn total_shares(&self) -> u128 {
        self.total_shares
    }

    pub fn shares_of(&self, provider: &Address) -> u128 {
        self.shares.get(provider).copied().unwrap_or(0)
    }

    /// Share holders, including the locked minimum under `Address::zero()`
    pub fn providers(&self) -> impl Iterator<Item = (&Address, u128)> {
        self.shares.iter().map(|(a, s)| (a, *s))
    }

    /// reserve_a · reserve_b
    pub fn invariant(&self) -> U256 {
        wide::product(self.reserve_a, self.reserve_b)
    }

    /// Preview of an exact-input swap at current reserves
    pub fn quote_out(&self, asset_in: Asset, amount_in: u128) -> CoreResult<SwapQuote> {
        if amount_in == 0 {
            return Err(CoreError::InvalidAmount);
        }
        let (reserve_in, reserve_out) = self.oriented(asset_in)?;
        Ok(math::quote_exact_in(reserve_in, reserve_out, amount_in)?)
    }

    /// Preview of an exact-output swap at current reserves
    pub fn quote_in(&self, asset_in: Asset, amount_out: u128) -> CoreResult<SwapQuote> {
        if amount_out == 0 {
            return Err(CoreError::InvalidAmount);
        }
        let (reserve_in, reserve_out) = self.oriented(asset_in)?;
        Ok(math::quote_exact_out(reserve_in, reserve_out, amount_out)?)
    }

    /// Deposit both assets for shares
    ///
    /// On a funded pair only the ratio-matching part of the desired amounts
    /// is pulled; the remainder never leaves the provider. `min_a` / `min_b`
    /// bound how far the matched amounts may fall below the desired ones.
    pub fn add_liquidity<T: TokenInterface>(
        &mut self,
        tokens: &mut TokenPair<'_, T>,
        provider: &Address,
        desired_a: u128,
        desired_b: u128,
        min_a: u128,
        min_b: u128,
    ) -> CoreResult<LiquidityReceipt> {
        if desired_a == 0 || desired_b == 0 {
            return Err(CoreError::InvalidAmount);
        }

        let seeding = self.total_shares == 0;
        let (amount_a, amount_b) = math::optimal_deposit(
            desired_a,
            desired_b,
            min_a,
            min_b,
            self.reserve_a,
            self.reserve_b,
        )?;

        let shares = if seeding {
            math::seed_shares(amount_a, amount_b)?
        } else {
            math::mint_shares(
                amount_a,
                amount_b,
                self.reserve_a,
                self.reserve_b,
                self.total_shares,
            )?
        };
        let locked = if seeding { MINIMUM_LIQUIDITY } else { 0 };

        let new_reserve_a = self
            .reserve_a
            .checked_add(amount_a)
            .ok_or(CoreError::ArithmeticOverflow)?;
        let new_reserve_b = self
            .reserve_b
            .checked_add(amount_b)
            .ok_or(CoreError::ArithmeticOverflow)?;
        let new_total = self
            .total_shares
            .checked_add(shares)
            .and_then(|t| t.checked_add(locked))
            .ok_or(CoreError::ArithmeticOverflow)?;

        self.pull_both(tokens, provider, amount_a, amount_b)?;

        self.reserve_a = new_reserve_a;
        self.reserve_b = new_reserve_b;
        self.total_shares = new_total;
        if locked > 0 {
            *self.shares.entry(Address::zero()).or_insert(0) += locked;
        }
        *self.shares.entry(provider.clone()).or_insert(0) += shares;

        log::info!(
            "pair {}: {} added {} A / {} B for {} shares (reserves {} / {})",
            self.address,
            provider,
            amount_a,
            amount_b,
            shares,
            self.reserve_a,
            self.reserve_b
        );

        Ok(LiquidityReceipt {
            amount_a,
            amount_b,
            shares,
        })
    }

    /// Burn shares for a proportional slice of both reserves
    ///
    /// Shares held by the zero address are the seed lock and never burn.
    pub fn remove_liquidity<T: TokenInterface>(
        &mut self,
        tokens: &mut TokenPair<'_, T>,
        provider: &Address,
        shares: u128,
    ) -> CoreResult<(u128, u128)> {
        if shares == 0 {
            return Err(CoreError::InvalidAmount);
        }
        if *provider == Address::zero() {
            return Err(CoreError::LockedLiquidity);
        }
        let held = self.shares_of(provider);
        if held < shares {
            return Err(CoreError::InsufficientShares {
                requested: shares,
                held,
            });
        }

        let (amount_a, amount_b) =
            math::burn_amounts(shares, self.reserve_a, self.reserve_b, self.total_shares)?;

        self.reserve_a -= amount_a;
        self.reserve_b -= amount_b;
        self.total_shares -= shares;
        if held == shares {
            self.shares.remove(provider);
        } else {
            self.shares.insert(provider.clone(), held - shares);
        }

        tokens.a.transfer(&self.address, provider, amount_a)?;
        tokens.b.transfer(&self.address, provider, amount_b)?;

        log::info!(
            "pair {}: {} burned {} shares for {} A / {} B",
            self.address,
            provider,
            shares,
            amount_a,
            amount_b
        );

        Ok((amount_a, amount_b))
    }

    /// Sell exactly `amount_in` of `asset_in`, receiving at least `min_amount_out`
    pub fn swap<T: TokenInterface>(
        &mut self,
        tokens: &mut TokenPair<'_, T>,
        trader: &Address,
        asset_in: Asset,
        amount_in: u128,
        min_amount_out: u128,
    ) -> CoreResult<SwapReceipt> {
        let quote = self.quote_out(asset_in, amount_in)?;
        if quote.amount_out < min_amount_out {
            return Err(CoreError::SlippageExceeded);
        }
        self.settle(tokens, trader, asset_in, quote)
    }

    /// Buy exactly `amount_out` of the other asset, paying at most `max_amount_in`
    pub fn swap_exact_out<T: TokenInterface>(
        &mut self,
        tokens: &mut TokenPair<'_, T>,
        trader: &Address,
        asset_in: Asset,
        amount_out: u128,
        max_amount_in: u128,
    ) -> CoreResult<SwapReceipt> {
        let quote = self.quote_in(asset_in, amount_out)?;
        if quote.amount_in > max_amount_in {
            return Err(CoreError::SlippageExceeded);
        }
        self.settle(tokens, trader, asset_in, quote)
    }

    fn settle<T: TokenInterface>(
        &mut self,
        tokens: &mut TokenPair<'_, T>,
        trader: &Address,
        asset_in: Asset,
        quote: SwapQuote,
    ) -> CoreResult<SwapReceipt> {
        let asset_out = asset_in.other();

        tokens
            .get_mut(asset_in)
            .transfer_from(&self.address, trader, &self.address, quote.amount_in)?;

        match asset_in {
            Asset::A => {
                self.reserve_a = quote.new_reserve_in;
                self.reserve_b = quote.new_reserve_out;
            }
            Asset::B => {
                self.reserve_b = quote.new_reserve_in;
                self.reserve_a = quote.new_reserve_out;
            }
        }

        tokens
            .get_mut(asset_out)
            .transfer(&self.address, trader, quote.amount_out)?;

        log::debug!(
            "pair {}: {} swapped {} {} for {} {} (reserves {} / {})",
            self.address,
            trader,
            quote.amount_in,
            asset_in,
            quote.amount_out,
            asset_out,
            self.reserve_a,
            self.reserve_b
        );

        Ok(SwapReceipt {
            asset_in,
            amount_in: quote.amount_in,
            amount_out: quote.amount_out,
        })
    }

    /// (reserve_in, reserve_out) for a trade paying `asset_in`
    fn oriented(&self, asset_in: Asset) -> CoreResult<(u128, u128)> {
        if self.reserve_a == 0 || self.reserve_b == 0 {
            return Err(CoreError::InsufficientLiquidity);
        }
        Ok(match asset_in {
            Asset::A => (self.reserve_a, self.reserve_b),
            Asset::B => (self.reserve_b, self.reserve_a),
        })
    }

    /// Pull both deposit legs, handing the first back if the second fails
    fn pull_both<T: TokenInterface>(
        &self,
        tokens: &mut TokenPair<'_, T>,
        provider: &Address,
        amount_a: u128,
        amount_b: u128,
    ) -> CoreResult<()> {
        tokens
            .a
            .transfer_from(&self.address, provider, &self.address, amount_a)?;
        if let Err(err) = tokens
            .b
            .transfer_from(&self.address, provider, &self.address, amount_b)
        {
            tokens.a.transfer(&self.address, provider, amount_a)?;
            return Err(err.into());
        }
        Ok(())
    }
}
