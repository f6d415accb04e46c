//! Token movement interface and the in-memory fungible token ledger

use std::collections::BTreeMap;
use thiserror::Error;

use crate::Address;

/// Failures of the token movement interface
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("{account} holds {available} but {needed} is required")]
    InsufficientBalance {
        account: Address,
        needed: u128,
        available: u128,
    },

    #[error("{spender} may move {available} of {owner}'s balance but {needed} is required")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        needed: u128,
        available: u128,
    },

    #[error("balance overflow")]
    Overflow,
}

/// The narrow capability every asset exposes to the core
///
/// Each call is all-or-nothing: on error no balance or allowance has changed.
/// The caller identity is explicit (`from`, `spender`, `owner`) rather than
/// ambient.
pub trait TokenInterface {
    /// Move `amount` from `from` to `to`, authorised by `from` itself
    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError>;

    /// Move `amount` from `from` to `to`, authorised by `spender`'s allowance
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), TokenError>;

    /// Set `spender`'s allowance over `owner`'s balance
    fn approve(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: u128,
    ) -> Result<(), TokenError>;

    fn balance_of(&self, account: &Address) -> u128;
}

/// In-memory fungible token with ERC-20 semantics
///
/// Amounts are raw base units; one whole token is `10^decimals` units.
/// An allowance of `u128::MAX` is treated as unlimited and never decremented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub symbol: String,
    pub decimals: u8,
    total_supply: u128,
    balances: BTreeMap<Address, u128>,
    allowances: BTreeMap<(Address, Address), u128>,
}

impl Token {
    pub fn new(symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
            total_supply: 0,
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
        }
    }

    /// Create new units out of thin air (bootstrap only)
    pub fn mint(&mut self, to: &Address, amount: u128) -> Result<(), TokenError> {
        let supply = self.total_supply.checked_add(amount).ok_or(TokenError::Overflow)?;
        let balance = self.balance_of(to).checked_add(amount).ok_or(TokenError::Overflow)?;
        self.total_supply = supply;
        self.balances.insert(to.clone(), balance);
        Ok(())
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Accounts with a non-zero balance
    pub fn holders(&self) -> impl Iterator<Item = (&Address, u128)> {
        self.balances.iter().filter(|(_, b)| **b > 0).map(|(a, b)| (a, *b))
    }

    /// Checks for a move without applying it
    fn check_move(&self, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                account: from.clone(),
                needed: amount,
                available,
            });
        }
        if from != to {
            self.balance_of(to).checked_add(amount).ok_or(TokenError::Overflow)?;
        }
        Ok(())
    }

    fn apply_move(&mut self, from: &Address, to: &Address, amount: u128) {
        if from == to || amount == 0 {
            return;
        }
        let from_balance = self.balance_of(from) - amount;
        let to_balance = self.balance_of(to) + amount;
        self.balances.insert(from.clone(), from_balance);
        self.balances.insert(to.clone(), to_balance);
    }
}

impl TokenInterface for Token {
    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError> {
        self.check_move(from, to, amount)?;
        self.apply_move(from, to, amount);
        log::trace!("{} transfer {} -> {}: {}", self.symbol, from, to, amount);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), TokenError> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(TokenError::InsufficientAllowance {
                owner: from.clone(),
                spender: spender.clone(),
                needed: amount,
                available: allowed,
            });
        }
        self.check_move(from, to, amount)?;

        if allowed != u128::MAX {
            self.allowances
                .insert((from.clone(), spender.clone()), allowed - amount);
        }
        self.apply_move(from, to, amount);
        log::trace!(
            "{} transfer_from {} -> {} by {}: {}",
            self.symbol,
            from,
            to,
            spender,
            amount
        );
        Ok(())
    }

    fn approve(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: u128,
    ) -> Result<(), TokenError> {
        self.allowances.insert((owner.clone(), spender.clone()), amount);
        Ok(())
    }

    fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded() -> (Token, Address, Address) {
        let alice = Address::new("alice");
        let bob = Address::new("bob");
        let mut token = Token::new("DVT", 18);
        token.mint(&alice, 1_000).unwrap();
        (token, alice, bob)
    }

    #[test]
    fn test_transfer_moves_balance() {
        let (mut token, alice, bob) = funded();
        token.transfer(&alice, &bob, 400).unwrap();
        assert_eq!(token.balance_of(&alice), 600);
        assert_eq!(token.balance_of(&bob), 400);
        assert_eq!(token.total_supply(), 1_000);
    }

    #[test]
    fn test_transfer_insufficient_balance_is_noop() {
        let (mut token, alice, bob) = funded();
        let before = token.clone();
        let err = token.transfer(&alice, &bob, 1_001).unwrap_err();
        assert!(matches!(
            err,
            TokenError::InsufficientBalance { needed: 1_001, available: 1_000, .. }
        ));
        assert_eq!(token, before);
    }

    #[test]
    fn test_transfer_from_spends_allowance() {
        let (mut token, alice, bob) = funded();
        let pool = Address::new("pool");
        token.approve(&alice, &pool, 300).unwrap();

        token.transfer_from(&pool, &alice, &bob, 200).unwrap();
        assert_eq!(token.allowance(&alice, &pool), 100);
        assert_eq!(token.balance_of(&bob), 200);

        let err = token.transfer_from(&pool, &alice, &bob, 200).unwrap_err();
        assert!(matches!(err, TokenError::InsufficientAllowance { available: 100, .. }));
        assert_eq!(token.balance_of(&bob), 200);
    }

    #[test]
    fn test_unlimited_allowance_not_decremented() {
        let (mut token, alice, bob) = funded();
        let pool = Address::new("pool");
        token.approve(&alice, &pool, u128::MAX).unwrap();
        token.transfer_from(&pool, &alice, &bob, 500).unwrap();
        assert_eq!(token.allowance(&alice, &pool), u128::MAX);
    }

    #[test]
    fn test_allowance_without_balance_leaves_allowance() {
        let (mut token, alice, bob) = funded();
        let pool = Address::new("pool");
        token.approve(&alice, &pool, 5_000).unwrap();
        assert!(token.transfer_from(&pool, &alice, &bob, 2_000).is_err());
        assert_eq!(token.allowance(&alice, &pool), 5_000);
    }

    #[test]
    fn test_mint_overflow() {
        let (mut token, alice, _) = funded();
        assert_eq!(token.mint(&alice, u128::MAX), Err(TokenError::Overflow));
        assert_eq!(token.balance_of(&alice), 1_000);
    }
}
