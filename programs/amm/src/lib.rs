//! Constant product reserve pair
//!
//! Holds two asset reserves, mints and burns liquidity shares, and swaps one
//! asset for the other along `reserve_a * reserve_b = k` with a 0.3% fee.
//! The curve math lives in `amm_model`; this crate owns the state and the
//! token movements around it.

pub mod math;
pub mod pair;

pub use pair::{LiquidityReceipt, ReservePair, SwapReceipt};
