//! Market configuration loaded from TOML

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use spotlend::{
    AccountParams, Address, Asset, AssetParams, MarketParams, DEPLOYER, PAIR, POOL,
};
use spotlend_common::math::{parse_units, MAX_DECIMALS};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarketConfig {
    pub market: MarketSection,
    pub assets: AssetsSection,
    pub seed: SeedSection,
    #[serde(default)]
    pub accounts: Vec<AccountSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarketSection {
    /// 30000 = 3x
    pub collateral_factor_bps: u64,
    /// Asset the pool lends
    #[serde(default = "default_borrow_asset")]
    pub borrow_asset: Asset,
}

fn default_borrow_asset() -> Asset {
    Asset::A
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetsSection {
    pub a: AssetSection,
    pub b: AssetSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetSection {
    pub symbol: String,
    pub decimals: u8,
}

/// Whole-token decimal strings, e.g. "100" or "0.5"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedSection {
    pub reserve_a: String,
    pub reserve_b: String,
    pub pool_funding: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountSection {
    pub name: String,
    #[serde(default = "zero")]
    pub balance_a: String,
    #[serde(default = "zero")]
    pub balance_b: String,
}

fn zero() -> String {
    "0".to_string()
}

impl Default for MarketConfig {
    /// 100 DVT : 10 WETH, 3x, 1,000,000 DVT in the pool
    fn default() -> Self {
        Self {
            market: MarketSection {
                collateral_factor_bps: 30_000,
                borrow_asset: Asset::A,
            },
            assets: AssetsSection {
                a: AssetSection {
                    symbol: "DVT".to_string(),
                    decimals: 18,
                },
                b: AssetSection {
                    symbol: "WETH".to_string(),
                    decimals: 18,
                },
            },
            seed: SeedSection {
                reserve_a: "100".to_string(),
                reserve_b: "10".to_string(),
                pool_funding: "1000000".to_string(),
            },
            accounts: vec![AccountSection {
                name: "attacker".to_string(),
                balance_a: "10000".to_string(),
                balance_b: "20".to_string(),
            }],
        }
    }
}

impl MarketConfig {
    /// Load from `path`, or the built-in deployment when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            log::debug!("no config given, using built-in deployment");
            return Ok(Self::default());
        };

        let path = expand_path(path)?;
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&data)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.market.collateral_factor_bps <= 10_000 {
            bail!(
                "collateral_factor_bps must exceed 10000 (1.0x), got {}",
                self.market.collateral_factor_bps
            );
        }
        for asset in [&self.assets.a, &self.assets.b] {
            if asset.decimals > MAX_DECIMALS {
                bail!(
                    "{} has {} decimals, at most {} supported",
                    asset.symbol,
                    asset.decimals,
                    MAX_DECIMALS
                );
            }
            if asset.symbol.trim().is_empty() {
                bail!("asset symbol must not be empty");
            }
        }

        let params = self.to_params()?;
        if params.seed_a == 0 || params.seed_b == 0 {
            bail!("seed reserves must be non-zero");
        }
        if params.pool_funding == 0 {
            bail!("pool_funding must be non-zero");
        }

        let sink = Address::zero();
        let mut names = BTreeSet::new();
        for account in &self.accounts {
            if [PAIR, POOL, DEPLOYER, sink.as_str()].contains(&account.name.as_str()) {
                bail!("account name {:?} is reserved", account.name);
            }
            if !names.insert(account.name.as_str()) {
                bail!("account {:?} listed twice", account.name);
            }
        }
        Ok(())
    }

    pub fn decimals(&self, asset: Asset) -> u8 {
        match asset {
            Asset::A => self.assets.a.decimals,
            Asset::B => self.assets.b.decimals,
        }
    }

    pub fn symbol(&self, asset: Asset) -> &str {
        match asset {
            Asset::A => &self.assets.a.symbol,
            Asset::B => &self.assets.b.symbol,
        }
    }

    /// Parse a whole-token amount of `asset` into raw units
    pub fn amount(&self, asset: Asset, value: &str) -> Result<u128> {
        parse_units(value, self.decimals(asset))
            .with_context(|| format!("bad {} amount", self.symbol(asset)))
    }

    pub fn to_params(&self) -> Result<MarketParams> {
        let borrow_asset = self.market.borrow_asset;
        let accounts = self
            .accounts
            .iter()
            .map(|account| {
                Ok(AccountParams {
                    name: account.name.clone(),
                    balance_a: self
                        .amount(Asset::A, &account.balance_a)
                        .with_context(|| format!("account {}", account.name))?,
                    balance_b: self
                        .amount(Asset::B, &account.balance_b)
                        .with_context(|| format!("account {}", account.name))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(MarketParams {
            asset_a: AssetParams {
                symbol: self.assets.a.symbol.clone(),
                decimals: self.assets.a.decimals,
            },
            asset_b: AssetParams {
                symbol: self.assets.b.symbol.clone(),
                decimals: self.assets.b.decimals,
            },
            borrow_asset,
            collateral_factor_bps: self.market.collateral_factor_bps,
            seed_a: self.amount(Asset::A, &self.seed.reserve_a)?,
            seed_b: self.amount(Asset::B, &self.seed.reserve_b)?,
            pool_funding: self.amount(borrow_asset, &self.seed.pool_funding)?,
            accounts,
        })
    }
}

/// Expand a leading `~` and environment variables
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .with_context(|| format!("Failed to expand path: {}", raw))?;
    Ok(PathBuf::from(expanded.as_ref()))
}
