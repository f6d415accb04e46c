//! Bootstrap parameters for a market

use spotlend_common::Asset;

const E18: u128 = 1_000_000_000_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetParams {
    pub symbol: String,
    pub decimals: u8,
}

/// Starting balances of a participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountParams {
    pub name: String,
    pub balance_a: u128,
    pub balance_b: u128,
}

/// Everything needed to stand a market up: the two assets, the seed
/// reserves, the pool's funding and the participants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketParams {
    pub asset_a: AssetParams,
    pub asset_b: AssetParams,
    /// Asset the pool lends; the other one is collateral
    pub borrow_asset: Asset,
    /// 30_000 = 3x
    pub collateral_factor_bps: u64,
    pub seed_a: u128,
    pub seed_b: u128,
    /// Borrow-asset units minted straight to the pool
    pub pool_funding: u128,
    pub accounts: Vec<AccountParams>,
}

impl MarketParams {
    /// 100 DVT : 10 WETH pair, a 3x pool holding 1,000,000 DVT, and an
    /// attacker with 10,000 DVT and 20 WETH
    pub fn deployment() -> Self {
        Self {
            asset_a: AssetParams {
                symbol: "DVT".to_string(),
                decimals: 18,
            },
            asset_b: AssetParams {
                symbol: "WETH".to_string(),
                decimals: 18,
            },
            borrow_asset: Asset::A,
            collateral_factor_bps: 30_000,
            seed_a: 100 * E18,
            seed_b: 10 * E18,
            pool_funding: 1_000_000 * E18,
            accounts: vec![AccountParams {
                name: "attacker".to_string(),
                balance_a: 10_000 * E18,
                balance_b: 20 * E18,
            }],
        }
    }
}

impl Default for MarketParams {
    fn default() -> Self {
        Self::deployment()
    }
}
