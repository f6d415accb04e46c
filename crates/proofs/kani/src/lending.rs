//! Kani proofs for the collateral requirement and position transitions
//!
//! - **L1: Monotone** - Requirement never falls as amount or price rises
//! - **L2: Rounds Up** - Requirement covers the exact product
//! - **L3: Full Repay** - Repaying the whole debt releases all collateral
//! - **L4: Release Bounded** - A partial repay never releases more than is posted

use lending_model::{apply_borrow, apply_repay, collateral_release, deposit_required, Position};

const MAX: u128 = 1 << 32;
const BPS: u128 = 10_000;

/// L1: Monotone in the borrowed amount
#[kani::proof]
#[kani::unwind(4)]
fn l1_monotone_in_amount() {
    let x: u128 = kani::any();
    let y: u128 = kani::any();
    let rb: u128 = kani::any();
    let rc: u128 = kani::any();
    let factor: u64 = kani::any();

    kani::assume(x > 0 && x <= y && y < MAX);
    kani::assume(rb > 0 && rb < MAX);
    kani::assume(rc > 0 && rc < MAX);
    kani::assume(factor > 10_000 && factor <= 100_000);

    if let (Ok(fx), Ok(fy)) = (
        deposit_required(x, rb, rc, factor),
        deposit_required(y, rb, rc, factor),
    ) {
        assert!(fx <= fy, "L1: more debt never needs less collateral");
    }
}

/// L1: Monotone in the collateral reserve (a pricier borrow asset)
#[kani::proof]
#[kani::unwind(4)]
fn l1_monotone_in_price() {
    let x: u128 = kani::any();
    let rb: u128 = kani::any();
    let rc: u128 = kani::any();
    let bump: u128 = kani::any();

    kani::assume(x > 0 && x < MAX);
    kani::assume(rb > 0 && rb < MAX);
    kani::assume(rc > 0 && rc < MAX);
    kani::assume(bump < MAX);

    if let (Ok(low), Ok(high)) = (
        deposit_required(x, rb, rc, 30_000),
        deposit_required(x, rb, rc + bump, 30_000),
    ) {
        assert!(low <= high, "L1: higher spot never needs less collateral");
    }
}

/// L2: required · rb · BPS >= x · rc · factor, and by less than one unit
#[kani::proof]
#[kani::unwind(4)]
fn l2_rounds_up() {
    let x: u128 = kani::any();
    let rb: u128 = kani::any();
    let rc: u128 = kani::any();

    kani::assume(x > 0 && x < (1 << 20));
    kani::assume(rb > 0 && rb < (1 << 20));
    kani::assume(rc > 0 && rc < (1 << 20));

    if let Ok(required) = deposit_required(x, rb, rc, 30_000) {
        let exact = x * rc * 30_000;
        let denom = rb * BPS;
        assert!(required * denom >= exact, "L2: requirement covers the product");
        assert!((required - 1) * denom < exact, "L2: at most one unit of rounding");
    }
}

/// L3: Borrow then repay everything returns every unit posted
#[kani::proof]
#[kani::unwind(4)]
fn l3_full_repay_releases_all() {
    let debt: u128 = kani::any();
    let collateral: u128 = kani::any();
    let amount: u128 = kani::any();
    let required: u128 = kani::any();

    kani::assume(debt < MAX && collateral < MAX);
    kani::assume(amount > 0 && amount < MAX);
    kani::assume(required > 0 && required < MAX);

    let start = Position { debt, collateral };
    if let Ok(open) = apply_borrow(start, amount, required) {
        let out = apply_repay(open, open.debt);
        assert!(out.is_ok());
        if let Ok(out) = out {
            assert!(out.position.is_closed(), "L3: full repay closes the position");
            assert_eq!(out.released, collateral + required);
        }
    }
}

/// L4: Partial release stays within the posted collateral
#[kani::proof]
#[kani::unwind(4)]
fn l4_partial_release_bounded() {
    let debt: u128 = kani::any();
    let collateral: u128 = kani::any();
    let amount: u128 = kani::any();

    kani::assume(debt > 0 && debt < MAX);
    kani::assume(collateral < MAX);
    kani::assume(amount > 0 && amount < debt);

    let position = Position { debt, collateral };
    if let Ok(released) = collateral_release(position, amount) {
        assert!(released <= collateral, "L4: cannot release more than posted");
    }
}
