//! Spot-priced lending market
//!
//! ⚠️ EDUCATIONAL USE ONLY ⚠️
//!
//! A constant product pair whose instantaneous reserves are the only price
//! feed for an over-collateralized lending pool. Because the price is read
//! at the moment of the borrow, anyone who can trade against the pair in the
//! same atomic unit can move it. This crate models that system faithfully so
//! the weakness can be reproduced and measured:
//!
//! 1. Swaps never decrease `reserve_a * reserve_b`
//! 2. A borrow posts `amount × spot × collateral_factor` of collateral, rounded up
//! 3. A full repay returns exactly the posted collateral
//! 4. A failing op anywhere in a unit leaves every balance, reserve and
//!    position as it was
//!
//! [`Market`] owns all state. Components are composed one way only:
//! pool → oracle → pair reserves.

#![forbid(unsafe_code)]

pub mod market;
pub mod params;
pub mod unit;

pub use market::{Market, DEPLOYER, PAIR, POOL};
pub use params::{AccountParams, AssetParams, MarketParams};
pub use unit::{AtomicUnit, Event, Op, Outcome, UnitError};

pub use spotlend_amm::{LiquidityReceipt, ReservePair, SwapReceipt};
pub use spotlend_common::math::{format_bps, format_units, parse_units, UnitsError, WAD};
pub use spotlend_common::{Address, Asset, CoreError, CoreResult, Token, TokenError, TokenInterface};
pub use spotlend_lending::{BorrowReceipt, Health, LendingPool, Position, RepayReceipt};
pub use spotlend_oracle::{spot_price, OracleError, ReserveSource, SpotPrice};
