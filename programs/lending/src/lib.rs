//! Lending pool that prices collateral off the pair's spot reserves
//!
//! A borrow of `amount` must post `amount × spot × collateral_factor` of the
//! other asset, where spot comes from [`spotlend_oracle::ReserveSource`] at
//! the moment of the call. Collateral and position math is in
//! `lending_model`; this crate owns the ledger and the token movements.

pub mod pool;

pub use lending_model::Position;
pub use pool::{BorrowReceipt, Health, LendingPool, RepayReceipt};
