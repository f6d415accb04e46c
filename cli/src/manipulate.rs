//! Dump-then-borrow in one atomic unit, reported before and after

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use spotlend::{AtomicUnit, Outcome, PAIR, POOL};

use crate::session::{fmt_wad, Session};

#[derive(Serialize)]
struct Snapshot {
    reserves: (u128, u128),
    spot_wad: u128,
    deposit_required: Option<u128>,
}

#[derive(Serialize)]
struct ManipulationReport {
    before: Snapshot,
    after: Option<Snapshot>,
    borrowed: u128,
    deposited: u128,
    committed: bool,
    error: Option<String>,
}

fn snapshot(session: &Session, borrow: u128) -> Snapshot {
    let pool = session.market.pool();
    Snapshot {
        reserves: session.market.pair().get_reserves(),
        spot_wad: session.price_wad(pool.borrow_asset(), pool.collateral_asset()),
        deposit_required: session.market.deposit_required(borrow).ok(),
    }
}

pub fn manipulate(session: &mut Session, account: &str, dump: &str, borrow: &str) -> Result<()> {
    let attacker = session.account(account);
    let pool = session.market.pool();
    let (borrow_asset, collateral_asset) = (pool.borrow_asset(), pool.collateral_asset());
    let dump = session.parse(borrow_asset, dump)?;
    let borrow = session.parse(borrow_asset, borrow)?;

    let before = snapshot(session, borrow);
    let unit = AtomicUnit::dump_and_borrow(
        &attacker,
        &session.account(PAIR),
        &session.account(POOL),
        borrow_asset,
        dump,
        borrow,
    );

    session.header("Before");
    session.field("Spot", session.fmt_price(borrow_asset, collateral_asset));
    if let Some(required) = before.deposit_required {
        session.field(
            "Required for borrow",
            session.fmt_amount(collateral_asset, required),
        );
    }
    session.field(
        "Attacker holds",
        session.fmt_amount(
            collateral_asset,
            session.market.balance_of(collateral_asset, &attacker),
        ),
    );

    let mut report = ManipulationReport {
        before,
        after: None,
        borrowed: 0,
        deposited: 0,
        committed: false,
        error: None,
    };

    match session.market.execute(&unit) {
        Ok(outcomes) => {
            if let Some(Outcome::Borrowed(receipt)) = outcomes.last() {
                report.borrowed = receipt.borrowed;
                report.deposited = receipt.deposited;
            }
            report.committed = true;
            report.after = Some(snapshot(session, borrow));

            session.header("After");
            session.field("Spot", session.fmt_price(borrow_asset, collateral_asset));
            session.field("Borrowed", session.fmt_amount(borrow_asset, report.borrowed));
            session.field(
                "Collateral posted",
                session.fmt_amount(collateral_asset, report.deposited),
            );
            session.field(
                "Pool left",
                session.fmt_amount(
                    borrow_asset,
                    session.market.balance_of(borrow_asset, session.market.pool().address()),
                ),
            );
            if let Some(honest) = report.before.deposit_required {
                if !session.json {
                    println!(
                        "\n{} {} instead of {}",
                        "Collateral discount:".bright_yellow().bold(),
                        session.fmt_amount(collateral_asset, report.deposited),
                        session.fmt_amount(collateral_asset, honest)
                    );
                }
            }
            if let Some(after) = &report.after {
                log::debug!(
                    "spot moved {} -> {}",
                    fmt_wad(report.before.spot_wad),
                    fmt_wad(after.spot_wad)
                );
            }
        }
        Err(err) => {
            if !session.json {
                println!("\n{} {}", "Unit rolled back:".bright_red().bold(), err);
            }
            report.error = Some(err.to_string());
        }
    }

    session.emit(&report)
}
