//! One CLI invocation: the bootstrapped market plus output settings

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use spotlend::{format_units, Address, Asset, AtomicUnit, Market, Outcome};
use spotlend_common::math::WAD_DECIMALS;
use std::fmt::Display;
use std::path::Path;

use crate::config::MarketConfig;
use crate::script::Script;

pub struct Session {
    pub config: MarketConfig,
    pub market: Market,
    pub json: bool,
}

impl Session {
    pub fn new(config: MarketConfig, json: bool) -> Result<Self> {
        let params = config.to_params()?;
        let market = Market::new(&params).context("Failed to bootstrap market")?;
        Ok(Self {
            config,
            market,
            json,
        })
    }

    /// Commit every unit of a setup script, stopping at the first failure
    pub fn run_setup(&mut self, path: &Path) -> Result<()> {
        let script = Script::load(path)?;
        for (name, unit) in script.compile(&self.config)? {
            self.market
                .execute(&unit)
                .with_context(|| format!("setup unit {:?} failed", name))?;
            log::info!("setup unit {:?} committed ({} ops)", name, unit.len());
        }
        Ok(())
    }

    /// Execute a unit, mapping rollback into an error
    pub fn execute(&mut self, unit: &AtomicUnit) -> Result<Vec<Outcome>> {
        Ok(self.market.execute(unit)?)
    }

    pub fn account(&self, name: &str) -> Address {
        Address::new(name)
    }

    pub fn parse(&self, asset: Asset, value: &str) -> Result<u128> {
        self.config.amount(asset, value)
    }

    /// "12.5 DVT"
    pub fn fmt_amount(&self, asset: Asset, raw: u128) -> String {
        format!(
            "{} {}",
            format_units(raw, self.config.decimals(asset)),
            self.config.symbol(asset)
        )
    }

    /// Price of `of` in `in_terms_of`, or "n/a" for an empty pair
    pub fn fmt_price(&self, of: Asset, in_terms_of: Asset) -> String {
        match self
            .market
            .spot_price(of, in_terms_of)
            .and_then(|p| Ok(p.to_wad()?))
        {
            Ok(wad) => format!(
                "{} {} per {}",
                format_units(wad, WAD_DECIMALS),
                self.config.symbol(in_terms_of),
                self.config.symbol(of)
            ),
            Err(_) => "n/a".to_string(),
        }
    }

    /// Spot price as WAD, 0 when the pair is empty
    pub fn price_wad(&self, of: Asset, in_terms_of: Asset) -> u128 {
        self.market
            .spot_price(of, in_terms_of)
            .ok()
            .and_then(|p| p.to_wad().ok())
            .unwrap_or(0)
    }

    pub fn header(&self, title: &str) {
        if !self.json {
            println!("{}", format!("=== {} ===", title).bright_green().bold());
        }
    }

    pub fn field(&self, label: &str, value: impl Display) {
        if !self.json {
            println!("{} {}", format!("{}:", label).bright_cyan(), value);
        }
    }

    pub fn note(&self, text: impl Display) {
        if !self.json {
            println!("{}", text.to_string().dimmed());
        }
    }

    pub fn emit<T: Serialize>(&self, report: &T) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        Ok(())
    }
}

/// WAD as a plain decimal string
pub fn fmt_wad(wad: u128) -> String {
    format_units(wad, WAD_DECIMALS)
}
