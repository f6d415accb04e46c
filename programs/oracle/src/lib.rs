//! Spot price read straight off a reserve pair
//!
//! The price of one asset in terms of the other is the instantaneous reserve
//! ratio. There is no averaging window and no staleness check, so whatever
//! the reserves say at the moment of the call is the price: a large swap
//! earlier in the same atomic unit moves it.

use serde::Serialize;
use spotlend_amm::math::{wide, U256};
use spotlend_amm::ReservePair;
use spotlend_common::math::{unit, WAD};
use spotlend_common::{Asset, CoreError};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("reserves are empty")]
    EmptyReserves,

    #[error("price does not fit in 128 bits")]
    Overflow,
}

impl From<OracleError> for CoreError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::EmptyReserves => CoreError::EmptyReserves,
            OracleError::Overflow => CoreError::ArithmeticOverflow,
        }
    }
}

/// Anything that can report two reserves and their decimals
pub trait ReserveSource {
    /// (reserve_a, reserve_b) in raw units
    fn get_reserves(&self) -> (u128, u128);

    fn decimals(&self, asset: Asset) -> u8;

    fn reserve(&self, asset: Asset) -> u128 {
        let (a, b) = self.get_reserves();
        match asset {
            Asset::A => a,
            Asset::B => b,
        }
    }
}

impl ReserveSource for ReservePair {
    fn get_reserves(&self) -> (u128, u128) {
        ReservePair::get_reserves(self)
    }

    fn decimals(&self, asset: Asset) -> u8 {
        ReservePair::decimals(self, asset)
    }
}

/// Exact reserve ratio: one unit of `of` is worth `quote_reserve / base_reserve`
/// units of `in_terms_of`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpotPrice {
    pub of: Asset,
    pub in_terms_of: Asset,
    pub base_reserve: u128,
    pub quote_reserve: u128,
    pub base_decimals: u8,
    pub quote_decimals: u8,
}

impl SpotPrice {
    /// Human-unit price scaled by 1e18 (floor)
    ///
    /// 100 A : 10 B with equal decimals gives 0.1e18 for A in terms of B.
    pub fn to_wad(&self) -> Result<u128, OracleError> {
        if self.base_reserve == 0 {
            return Err(OracleError::EmptyReserves);
        }
        let base_unit = unit(self.base_decimals).map_err(|_| OracleError::Overflow)?;
        let quote_unit = unit(self.quote_decimals).map_err(|_| OracleError::Overflow)?;

        let numerator = wide::product(self.quote_reserve, base_unit)
            .checked_mul(U256::from(WAD))
            .ok_or(OracleError::Overflow)?;
        let denominator = wide::product(self.base_reserve, quote_unit);

        wide::narrow(numerator / denominator).map_err(|_| OracleError::Overflow)
    }

    /// Value of `amount` raw units of `of`, in raw units of `in_terms_of` (floor)
    pub fn quote(&self, amount: u128) -> Result<u128, OracleError> {
        if self.base_reserve == 0 {
            return Err(OracleError::EmptyReserves);
        }
        wide::mul_div(amount, self.quote_reserve, self.base_reserve)
            .map_err(|_| OracleError::Overflow)
    }
}

/// Price of `of` in terms of `in_terms_of` at the source's current reserves
pub fn spot_price<S: ReserveSource + ?Sized>(
    source: &S,
    of: Asset,
    in_terms_of: Asset,
) -> Result<SpotPrice, OracleError> {
    let base_reserve = source.reserve(of);
    let quote_reserve = source.reserve(in_terms_of);
    if base_reserve == 0 || quote_reserve == 0 {
        return Err(OracleError::EmptyReserves);
    }

    let price = SpotPrice {
        of,
        in_terms_of,
        base_reserve,
        quote_reserve,
        base_decimals: source.decimals(of),
        quote_decimals: source.decimals(in_terms_of),
    };
    log::debug!(
        "spot {} in {}: {} / {}",
        of,
        in_terms_of,
        quote_reserve,
        base_reserve
    );
    Ok(price)
}
