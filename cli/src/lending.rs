//! Borrow and repay against the lending pool

use anyhow::{bail, Result};
use colored::Colorize;
use serde::Serialize;
use spotlend::{AtomicUnit, BorrowReceipt, Health, Op, Outcome, RepayReceipt, POOL};

use crate::session::Session;

#[derive(Serialize)]
struct BorrowReport {
    receipt: BorrowReceipt,
    health: Option<Health>,
}

#[derive(Serialize)]
struct RepayReport {
    receipt: RepayReceipt,
    health: Option<Health>,
}

/// Approve the pool for collateral and borrow in one unit
pub fn borrow(session: &mut Session, account: &str, amount: &str) -> Result<()> {
    let borrower = session.account(account);
    let pool = session.market.pool();
    let (borrow_asset, collateral_asset) = (pool.borrow_asset(), pool.collateral_asset());
    let amount = session.parse(borrow_asset, amount)?;

    let unit = AtomicUnit::new()
        .then(Op::Approve {
            owner: borrower.clone(),
            asset: collateral_asset,
            spender: session.account(POOL),
            amount: u128::MAX,
        })
        .then(Op::Borrow {
            borrower: borrower.clone(),
            amount,
        });
    let outcomes = session.execute(&unit)?;
    let Some(Outcome::Borrowed(receipt)) = outcomes.last().copied() else {
        bail!("borrow unit produced no borrow receipt");
    };
    let health = session.market.health(&borrower)?;

    session.header("Borrow");
    session.field("Borrower", account);
    session.field("Borrowed", session.fmt_amount(borrow_asset, receipt.borrowed));
    session.field(
        "Collateral posted",
        session.fmt_amount(collateral_asset, receipt.deposited),
    );
    if let Some(h) = &health {
        session.field("Debt", session.fmt_amount(borrow_asset, h.debt));
        session.field("Collateral", session.fmt_amount(collateral_asset, h.collateral));
    }
    if !session.json {
        println!("\n{}", "Borrow committed".bright_green());
    }

    session.emit(&BorrowReport { receipt, health })
}

/// Approve the pool for the repayment and repay in one unit
pub fn repay(session: &mut Session, account: &str, amount: &str) -> Result<()> {
    let borrower = session.account(account);
    let pool = session.market.pool();
    let (borrow_asset, collateral_asset) = (pool.borrow_asset(), pool.collateral_asset());
    let amount = session.parse(borrow_asset, amount)?;

    let unit = AtomicUnit::new()
        .then(Op::Approve {
            owner: borrower.clone(),
            asset: borrow_asset,
            spender: session.account(POOL),
            amount,
        })
        .then(Op::Repay {
            borrower: borrower.clone(),
            amount,
        });
    let outcomes = session.execute(&unit)?;
    let Some(Outcome::Repaid(receipt)) = outcomes.last().copied() else {
        bail!("repay unit produced no repay receipt");
    };
    let health = session.market.health(&borrower)?;

    session.header("Repay");
    session.field("Borrower", account);
    session.field("Repaid", session.fmt_amount(borrow_asset, receipt.repaid));
    session.field(
        "Collateral released",
        session.fmt_amount(collateral_asset, receipt.released),
    );
    if receipt.closed {
        session.note("position closed");
    } else if let Some(h) = &health {
        session.field("Remaining debt", session.fmt_amount(borrow_asset, h.debt));
    }
    if !session.json {
        println!("\n{}", "Repay committed".bright_green());
    }

    session.emit(&RepayReport { receipt, health })
}
