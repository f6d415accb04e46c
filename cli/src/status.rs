//! Read-only views: market status and collateral quotes

use anyhow::Result;
use serde::Serialize;
use spotlend::{format_bps, Address, Asset};

use crate::session::{fmt_wad, Session};

#[derive(Serialize)]
struct PairReport {
    reserve_a: u128,
    reserve_b: u128,
    total_shares: u128,
    price_a_in_b_wad: u128,
    price_b_in_a_wad: u128,
}

#[derive(Serialize)]
struct PoolReport {
    borrow_asset: Asset,
    collateral_factor_bps: u64,
    liquidity: u128,
    total_debt: u128,
    total_collateral: u128,
}

#[derive(Serialize)]
struct AccountReport {
    account: Address,
    balance_a: u128,
    balance_b: u128,
    debt: u128,
    collateral: u128,
}

#[derive(Serialize)]
struct StatusReport {
    pair: PairReport,
    pool: PoolReport,
    accounts: Vec<AccountReport>,
}

pub fn show_status(session: &Session) -> Result<()> {
    let market = &session.market;
    let pair = market.pair();
    let pool = market.pool();
    let (reserve_a, reserve_b) = pair.get_reserves();
    let borrow = pool.borrow_asset();
    let collateral = pool.collateral_asset();
    let liquidity = market.balance_of(borrow, pool.address());

    session.header("Reserve Pair");
    session.field("Reserve A", session.fmt_amount(Asset::A, reserve_a));
    session.field("Reserve B", session.fmt_amount(Asset::B, reserve_b));
    session.field("Total shares", pair.total_shares());
    session.field("Spot A", session.fmt_price(Asset::A, Asset::B));
    session.field("Spot B", session.fmt_price(Asset::B, Asset::A));

    session.header("Lending Pool");
    session.field("Lends", session.config.symbol(borrow));
    session.field("Collateral", session.config.symbol(collateral));
    session.field("Collateral factor", format_bps(pool.collateral_factor_bps()));
    session.field("Liquidity", session.fmt_amount(borrow, liquidity));
    session.field("Total debt", session.fmt_amount(borrow, pool.total_debt()));
    session.field(
        "Total collateral",
        session.fmt_amount(collateral, pool.total_collateral()),
    );

    session.header("Accounts");
    let mut accounts = Vec::new();
    for account in market.holders() {
        let position = market.position(account).unwrap_or_default();
        let report = AccountReport {
            account: account.clone(),
            balance_a: market.balance_of(Asset::A, account),
            balance_b: market.balance_of(Asset::B, account),
            debt: position.debt,
            collateral: position.collateral,
        };
        let mut line = format!(
            "{} / {}",
            session.fmt_amount(Asset::A, report.balance_a),
            session.fmt_amount(Asset::B, report.balance_b)
        );
        if report.debt > 0 {
            line.push_str(&format!(
                " (owes {}, posted {})",
                session.fmt_amount(borrow, report.debt),
                session.fmt_amount(collateral, report.collateral)
            ));
        }
        session.field(account.as_str(), line);
        accounts.push(report);
    }

    session.emit(&StatusReport {
        pair: PairReport {
            reserve_a,
            reserve_b,
            total_shares: pair.total_shares(),
            price_a_in_b_wad: session.price_wad(Asset::A, Asset::B),
            price_b_in_a_wad: session.price_wad(Asset::B, Asset::A),
        },
        pool: PoolReport {
            borrow_asset: borrow,
            collateral_factor_bps: pool.collateral_factor_bps(),
            liquidity,
            total_debt: pool.total_debt(),
            total_collateral: pool.total_collateral(),
        },
        accounts,
    })
}

#[derive(Serialize)]
struct QuoteReport {
    amount: u128,
    deposit_required: u128,
    spot_wad: u128,
}

/// Collateral needed to borrow `amount` at current reserves
pub fn show_quote(session: &Session, amount: &str) -> Result<()> {
    let pool = session.market.pool();
    let borrow = pool.borrow_asset();
    let collateral = pool.collateral_asset();
    let raw = session.parse(borrow, amount)?;
    let required = session.market.deposit_required(raw)?;
    let spot_wad = session.price_wad(borrow, collateral);

    session.header("Deposit Quote");
    session.field("Borrow", session.fmt_amount(borrow, raw));
    session.field("Spot", session.fmt_price(borrow, collateral));
    session.field("Factor", format_bps(pool.collateral_factor_bps()));
    session.field("Required", session.fmt_amount(collateral, required));
    session.note(format!("price as WAD: {}", fmt_wad(spot_wad)));

    session.emit(&QuoteReport {
        amount: raw,
        deposit_required: required,
        spot_wad,
    })
}
