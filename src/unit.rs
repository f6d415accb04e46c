//! Atomic units: ordered operations that either all apply or none do

use serde::Serialize;
use spotlend_amm::{LiquidityReceipt, SwapReceipt};
use spotlend_common::{Address, Asset, CoreError};
use spotlend_lending::{BorrowReceipt, RepayReceipt};
use thiserror::Error;

/// One state-changing step inside an [`AtomicUnit`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    Approve {
        owner: Address,
        asset: Asset,
        spender: Address,
        amount: u128,
    },
    Transfer {
        asset: Asset,
        from: Address,
        to: Address,
        amount: u128,
    },
    AddLiquidity {
        provider: Address,
        amount_a: u128,
        amount_b: u128,
        min_a: u128,
        min_b: u128,
    },
    RemoveLiquidity {
        provider: Address,
        shares: u128,
    },
    Swap {
        trader: Address,
        asset_in: Asset,
        amount_in: u128,
        min_out: u128,
    },
    SwapExactOut {
        trader: Address,
        asset_in: Asset,
        amount_out: u128,
        max_in: u128,
    },
    Borrow {
        borrower: Address,
        amount: u128,
    },
    Repay {
        borrower: Address,
        amount: u128,
    },
}

impl Op {
    pub fn name(&self) -> &'static str {
        match self {
            Op::Approve { .. } => "approve",
            Op::Transfer { .. } => "transfer",
            Op::AddLiquidity { .. } => "add_liquidity",
            Op::RemoveLiquidity { .. } => "remove_liquidity",
            Op::Swap { .. } => "swap",
            Op::SwapExactOut { .. } => "swap_exact_out",
            Op::Borrow { .. } => "borrow",
            Op::Repay { .. } => "repay",
        }
    }
}

/// What a successful [`Op`] produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Approved,
    Transferred,
    LiquidityAdded(LiquidityReceipt),
    LiquidityRemoved { amount_a: u128, amount_b: u128 },
    Swapped(SwapReceipt),
    Borrowed(BorrowReceipt),
    Repaid(RepayReceipt),
}

/// Journal entry appended by every applied op; discarded with a rolled back unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Approval {
        owner: Address,
        spender: Address,
        asset: Asset,
        amount: u128,
    },
    Transfer {
        asset: Asset,
        from: Address,
        to: Address,
        amount: u128,
    },
    LiquidityAdded {
        provider: Address,
        amount_a: u128,
        amount_b: u128,
        shares: u128,
    },
    LiquidityRemoved {
        provider: Address,
        shares: u128,
        amount_a: u128,
        amount_b: u128,
    },
    Swap {
        trader: Address,
        asset_in: Asset,
        amount_in: u128,
        amount_out: u128,
    },
    Borrowed {
        borrower: Address,
        amount: u128,
        deposit: u128,
    },
    Repaid {
        borrower: Address,
        amount: u128,
        released: u128,
    },
}

/// Ordered operations executed back to back with all-or-nothing semantics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AtomicUnit {
    ops: Vec<Op>,
}

impl AtomicUnit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an op
    pub fn then(mut self, op: Op) -> Self {
        self.ops.push(op);
        self
    }

    pub fn push(&mut self, op: Op) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Dump `dump` of the collateral-priced asset into the pair, then borrow
    /// `borrow` of it against the now cheaper collateral
    ///
    /// `borrow_asset` is the asset the pool lends; the attacker sells it into
    /// the pair, which pushes its spot price down before the borrow reads it.
    pub fn dump_and_borrow(
        attacker: &Address,
        pair: &Address,
        pool: &Address,
        borrow_asset: Asset,
        dump: u128,
        borrow: u128,
    ) -> Self {
        Self::new()
            .then(Op::Approve {
                owner: attacker.clone(),
                asset: borrow_asset,
                spender: pair.clone(),
                amount: dump,
            })
            .then(Op::Swap {
                trader: attacker.clone(),
                asset_in: borrow_asset,
                amount_in: dump,
                min_out: 1,
            })
            .then(Op::Approve {
                owner: attacker.clone(),
                asset: borrow_asset.other(),
                spender: pool.clone(),
                amount: u128::MAX,
            })
            .then(Op::Borrow {
                borrower: attacker.clone(),
                amount: borrow,
            })
    }

    /// Append an approval of `pair` and a sale of `amount_in` of `asset_in`
    pub fn then_swap(
        self,
        trader: &Address,
        pair: &Address,
        asset_in: Asset,
        amount_in: u128,
    ) -> Self {
        self.then(Op::Approve {
            owner: trader.clone(),
            asset: asset_in,
            spender: pair.clone(),
            amount: amount_in,
        })
        .then(Op::Swap {
            trader: trader.clone(),
            asset_in,
            amount_in,
            min_out: 1,
        })
    }
}

impl From<Vec<Op>> for AtomicUnit {
    fn from(ops: Vec<Op>) -> Self {
        Self { ops }
    }
}

impl FromIterator<Op> for AtomicUnit {
    fn from_iter<I: IntoIterator<Item = Op>>(iter: I) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

/// Failure of one op; the whole unit it belonged to was rolled back
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("op {index} ({}) failed: {source}", .op.name())]
pub struct UnitError {
    /// Position of the failing op in the unit
    pub index: usize,
    pub op: Op,
    pub source: CoreError,
}
