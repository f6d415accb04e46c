//! Atomic unit scripts
//!
//! A script is a TOML file with one or more `[[units]]`, each holding an
//! ordered list of `[[units.ops]]`. Amounts are whole-token decimal strings
//! in the asset the op moves; `"max"` means unlimited. Liquidity shares are
//! raw integers.
//!
//! ```toml
//! [[units]]
//! [[units.ops]]
//! op = "swap"
//! trader = "attacker"
//! asset_in = "a"
//! amount_in = "10000"
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use spotlend::{Address, Asset, AtomicUnit, Op};
use std::fs;
use std::path::Path;

use crate::config::{expand_path, MarketConfig};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    pub units: Vec<ScriptUnit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptUnit {
    #[serde(default)]
    pub name: Option<String>,
    pub ops: Vec<ScriptOp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptOp {
    Approve {
        owner: String,
        asset: Asset,
        spender: String,
        amount: String,
    },
    Transfer {
        asset: Asset,
        from: String,
        to: String,
        amount: String,
    },
    AddLiquidity {
        provider: String,
        amount_a: String,
        amount_b: String,
        #[serde(default)]
        min_a: Option<String>,
        #[serde(default)]
        min_b: Option<String>,
    },
    RemoveLiquidity {
        provider: String,
        shares: String,
    },
    Swap {
        trader: String,
        asset_in: Asset,
        amount_in: String,
        #[serde(default)]
        min_out: Option<String>,
    },
    SwapExactOut {
        trader: String,
        asset_in: Asset,
        amount_out: String,
        #[serde(default)]
        max_in: Option<String>,
    },
    Borrow {
        borrower: String,
        amount: String,
    },
    Repay {
        borrower: String,
        amount: String,
    },
}

impl Script {
    pub fn load(path: &Path) -> Result<Self> {
        let path = expand_path(path)?;
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read script: {}", path.display()))?;
        let script: Self = toml::from_str(&data)
            .with_context(|| format!("Failed to parse script: {}", path.display()))?;
        if script.units.is_empty() {
            bail!("script {} has no units", path.display());
        }
        Ok(script)
    }

    /// Resolve every unit into market ops
    pub fn compile(&self, config: &MarketConfig) -> Result<Vec<(String, AtomicUnit)>> {
        self.units
            .iter()
            .enumerate()
            .map(|(i, unit)| {
                let name = unit.name.clone().unwrap_or_else(|| format!("unit {}", i));
                let ops = unit
                    .ops
                    .iter()
                    .enumerate()
                    .map(|(j, op)| {
                        op.compile(config)
                            .with_context(|| format!("{}: op {}", name, j))
                    })
                    .collect::<Result<AtomicUnit>>()?;
                Ok((name, ops))
            })
            .collect()
    }
}

impl ScriptOp {
    fn compile(&self, config: &MarketConfig) -> Result<Op> {
        let amount = |asset: Asset, value: &str| -> Result<u128> {
            if value == "max" {
                Ok(u128::MAX)
            } else {
                config.amount(asset, value)
            }
        };
        let optional = |asset: Asset, value: &Option<String>, default: u128| -> Result<u128> {
            match value {
                Some(v) => amount(asset, v),
                None => Ok(default),
            }
        };

        Ok(match self {
            ScriptOp::Approve {
                owner,
                asset,
                spender,
                amount: value,
            } => Op::Approve {
                owner: Address::new(owner.as_str()),
                asset: *asset,
                spender: Address::new(spender.as_str()),
                amount: amount(*asset, value)?,
            },
            ScriptOp::Transfer {
                asset,
                from,
                to,
                amount: value,
            } => Op::Transfer {
                asset: *asset,
                from: Address::new(from.as_str()),
                to: Address::new(to.as_str()),
                amount: amount(*asset, value)?,
            },
            ScriptOp::AddLiquidity {
                provider,
                amount_a,
                amount_b,
                min_a,
                min_b,
            } => Op::AddLiquidity {
                provider: Address::new(provider.as_str()),
                amount_a: amount(Asset::A, amount_a)?,
                amount_b: amount(Asset::B, amount_b)?,
                min_a: optional(Asset::A, min_a, 0)?,
                min_b: optional(Asset::B, min_b, 0)?,
            },
            ScriptOp::RemoveLiquidity { provider, shares } => Op::RemoveLiquidity {
                provider: Address::new(provider.as_str()),
                shares: shares
                    .replace('_', "")
                    .parse()
                    .with_context(|| format!("bad share count {:?}", shares))?,
            },
            ScriptOp::Swap {
                trader,
                asset_in,
                amount_in,
                min_out,
            } => Op::Swap {
                trader: Address::new(trader.as_str()),
                asset_in: *asset_in,
                amount_in: amount(*asset_in, amount_in)?,
                min_out: optional(asset_in.other(), min_out, 1)?,
            },
            ScriptOp::SwapExactOut {
                trader,
                asset_in,
                amount_out,
                max_in,
            } => Op::SwapExactOut {
                trader: Address::new(trader.as_str()),
                asset_in: *asset_in,
                amount_out: amount(asset_in.other(), amount_out)?,
                max_in: optional(*asset_in, max_in, u128::MAX)?,
            },
            ScriptOp::Borrow {
                borrower,
                amount: value,
            } => Op::Borrow {
                borrower: Address::new(borrower.as_str()),
                amount: amount(config.market.borrow_asset, value)?,
            },
            ScriptOp::Repay {
                borrower,
                amount: value,
            } => Op::Repay {
                borrower: Address::new(borrower.as_str()),
                amount: amount(config.market.borrow_asset, value)?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const E18: u128 = 1_000_000_000_000_000_000;

    const DRAIN: &str = r#"
[[units]]
name = "drain"

[[units.ops]]
op = "approve"
owner = "attacker"
asset = "a"
spender = "pair"
amount = "max"

[[units.ops]]
op = "swap"
trader = "attacker"
asset_in = "a"
amount_in = "10000"

[[units.ops]]
op = "approve"
owner = "attacker"
asset = "b"
spender = "pool"
amount = "max"

[[units.ops]]
op = "borrow"
borrower = "attacker"
amount = "1000000"
"#;

    fn load(body: &str) -> Result<Script> {
        let dir = TempDir::new()?;
        let path = dir.path().join("script.toml");
        fs::File::create(&path)?.write_all(body.as_bytes())?;
        Script::load(&path)
    }

    #[test]
    fn test_compile_drain() {
        let script = load(DRAIN).unwrap();
        let units = script.compile(&MarketConfig::default()).unwrap();
        assert_eq!(units.len(), 1);

        let (name, unit) = &units[0];
        assert_eq!(name, "drain");
        assert_eq!(unit.len(), 4);
        assert_eq!(
            unit.ops()[1],
            Op::Swap {
                trader: Address::new("attacker"),
                asset_in: Asset::A,
                amount_in: 10_000 * E18,
                min_out: 1,
            }
        );
        assert_eq!(
            unit.ops()[3],
            Op::Borrow {
                borrower: Address::new("attacker"),
                amount: 1_000_000 * E18,
            }
        );
    }

    #[test]
    fn test_bad_amount_names_the_op() {
        let script = load(&DRAIN.replace("\"10000\"", "\"ten\"")).unwrap();
        let err = script.compile(&MarketConfig::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("drain: op 1"));
    }

    #[test]
    fn test_unknown_op() {
        assert!(load(&DRAIN.replace("op = \"borrow\"", "op = \"liquidate\"")).is_err());
    }

    #[test]
    fn test_empty_script() {
        assert!(load("units = []").is_err());
    }
}
