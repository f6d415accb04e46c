//! Swaps against the reserve pair

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use spotlend::{Asset, AtomicUnit, Op, Outcome, SwapReceipt, PAIR};

use crate::session::Session;

#[derive(Serialize)]
struct SwapReport {
    receipt: SwapReceipt,
    reserves_before: (u128, u128),
    reserves_after: (u128, u128),
}

/// Approve the pair and sell `amount` of `asset_in` in one unit
pub fn swap(
    session: &mut Session,
    account: &str,
    asset_in: Asset,
    amount: &str,
    min_out: Option<&str>,
) -> Result<()> {
    let trader = session.account(account);
    let amount_in = session.parse(asset_in, amount)?;
    let min_out = match min_out {
        Some(value) => session.parse(asset_in.other(), value)?,
        None => 1,
    };
    let reserves_before = session.market.pair().get_reserves();
    let price_before = session.fmt_price(Asset::A, Asset::B);

    let unit = AtomicUnit::new()
        .then(Op::Approve {
            owner: trader.clone(),
            asset: asset_in,
            spender: session.account(PAIR),
            amount: amount_in,
        })
        .then(Op::Swap {
            trader,
            asset_in,
            amount_in,
            min_out,
        });
    let outcomes = session.execute(&unit)?;
    let Some(Outcome::Swapped(receipt)) = outcomes.last().copied() else {
        anyhow::bail!("swap unit produced no swap receipt");
    };

    session.header("Swap");
    session.field("Trader", account);
    session.field("Paid", session.fmt_amount(asset_in, receipt.amount_in));
    session.field(
        "Received",
        session.fmt_amount(asset_in.other(), receipt.amount_out),
    );
    session.field("Spot A before", price_before);
    session.field("Spot A after", session.fmt_price(Asset::A, Asset::B));
    if !session.json {
        println!("\n{}", "Swap committed".bright_green());
    }

    session.emit(&SwapReport {
        receipt,
        reserves_before,
        reserves_after: session.market.pair().get_reserves(),
    })
}
