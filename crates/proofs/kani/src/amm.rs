//! Kani proofs for the constant product pair
//!
//! These proofs check the swap and share math the pair settles against:
//! - **A1: Invariant Increasing** - x·y strictly grows across every accepted swap
//! - **A2: Reserves Positive** - No swap empties either side of the pool
//! - **A3: Exact Out Covers** - The quoted input always buys at least the requested output
//! - **A4: Deterministic** - Same inputs always produce same outputs
//! - **A5: Seed Lock** - The first deposit always locks MINIMUM_LIQUIDITY shares

use amm_model::{
    burn_amounts, get_amount_in, get_amount_out, quote_exact_in, quote_exact_out, seed_shares,
    MINIMUM_LIQUIDITY,
};

/// Keeps the solver on small reserves; the math is width-independent
const MAX_RESERVE: u128 = 1 << 32;

/// A1: Invariant strictly increases for exact-in swaps
///
/// Property: whenever a quote is produced, new_in · new_out > in · out.
#[kani::proof]
#[kani::unwind(4)]
fn a1_invariant_increases_exact_in() {
    let reserve_in: u128 = kani::any();
    let reserve_out: u128 = kani::any();
    let amount_in: u128 = kani::any();

    kani::assume(reserve_in > 0 && reserve_in < MAX_RESERVE);
    kani::assume(reserve_out > 0 && reserve_out < MAX_RESERVE);
    kani::assume(amount_in > 0 && amount_in < MAX_RESERVE);

    if let Ok(q) = quote_exact_in(reserve_in, reserve_out, amount_in) {
        let k0 = reserve_in * reserve_out;
        let k1 = q.new_reserve_in * q.new_reserve_out;
        assert!(k1 > k0, "A1: k must grow on exact-in swap");
        assert_eq!(q.new_reserve_in, reserve_in + amount_in);
        assert_eq!(q.new_reserve_out, reserve_out - q.amount_out);
    }
}

/// A1: Invariant strictly increases for exact-out swaps
#[kani::proof]
#[kani::unwind(4)]
fn a1_invariant_increases_exact_out() {
    let reserve_in: u128 = kani::any();
    let reserve_out: u128 = kani::any();
    let amount_out: u128 = kani::any();

    kani::assume(reserve_in > 0 && reserve_in < MAX_RESERVE);
    kani::assume(reserve_out > 0 && reserve_out < MAX_RESERVE);
    kani::assume(amount_out > 0 && amount_out < reserve_out);

    if let Ok(q) = quote_exact_out(reserve_in, reserve_out, amount_out) {
        let k0 = reserve_in * reserve_out;
        let k1 = q.new_reserve_in * q.new_reserve_out;
        assert!(k1 > k0, "A1: k must grow on exact-out swap");
    }
}

/// A2: Output never reaches the output reserve
#[kani::proof]
#[kani::unwind(4)]
fn a2_reserves_stay_positive() {
    let reserve_in: u128 = kani::any();
    let reserve_out: u128 = kani::any();
    let amount_in: u128 = kani::any();

    kani::assume(reserve_in > 0 && reserve_in < MAX_RESERVE);
    kani::assume(reserve_out > 0 && reserve_out < MAX_RESERVE);
    kani::assume(amount_in > 0 && amount_in < MAX_RESERVE);

    if let Ok(out) = get_amount_out(amount_in, reserve_in, reserve_out) {
        assert!(out > 0, "A2: accepted swap pays something");
        assert!(out < reserve_out, "A2: output reserve must stay positive");
    }
}

/// A3: Paying get_amount_in(Δout) yields at least Δout
#[kani::proof]
#[kani::unwind(4)]
fn a3_exact_out_input_is_sufficient() {
    let reserve_in: u128 = kani::any();
    let reserve_out: u128 = kani::any();
    let amount_out: u128 = kani::any();

    kani::assume(reserve_in > 1000 && reserve_in < MAX_RESERVE);
    kani::assume(reserve_out > 1000 && reserve_out < MAX_RESERVE);
    kani::assume(amount_out > 0 && amount_out < reserve_out / 2);

    if let Ok(amount_in) = get_amount_in(amount_out, reserve_in, reserve_out) {
        if let Ok(received) = get_amount_out(amount_in, reserve_in, reserve_out) {
            assert!(
                received >= amount_out,
                "A3: quoted input must cover the requested output"
            );
        }
    }
}

/// A4: Quotes are deterministic
#[kani::proof]
#[kani::unwind(4)]
fn a4_deterministic() {
    let reserve_in: u128 = kani::any();
    let reserve_out: u128 = kani::any();
    let amount_in: u128 = kani::any();

    kani::assume(reserve_in < MAX_RESERVE);
    kani::assume(reserve_out < MAX_RESERVE);
    kani::assume(amount_in < MAX_RESERVE);

    let r1 = quote_exact_in(reserve_in, reserve_out, amount_in);
    let r2 = quote_exact_in(reserve_in, reserve_out, amount_in);
    assert_eq!(r1, r2, "A4: same inputs must give the same quote");
}

/// A5: Seed shares plus the locked minimum never exceed sqrt(a·b)
#[kani::proof]
#[kani::unwind(70)]
fn a5_seed_locks_minimum() {
    let a: u128 = kani::any();
    let b: u128 = kani::any();

    kani::assume(a > 0 && a < (1 << 24));
    kani::assume(b > 0 && b < (1 << 24));

    if let Ok(shares) = seed_shares(a, b) {
        let total = shares + MINIMUM_LIQUIDITY;
        assert!(total * total <= a * b, "A5: total shares bounded by sqrt(a·b)");
        assert!((total + 1) * (total + 1) > a * b, "A5: total shares is the floor root");
    }
}

/// Burning never pays out more than the reserves hold
#[kani::proof]
#[kani::unwind(4)]
fn burn_bounded_by_reserves() {
    let shares: u128 = kani::any();
    let reserve_a: u128 = kani::any();
    let reserve_b: u128 = kani::any();
    let total: u128 = kani::any();

    kani::assume(total > 0 && total < MAX_RESERVE);
    kani::assume(reserve_a < MAX_RESERVE && reserve_b < MAX_RESERVE);

    if let Ok((a, b)) = burn_amounts(shares, reserve_a, reserve_b, total) {
        assert!(a <= reserve_a);
        assert!(b <= reserve_b);
        if shares == total {
            assert_eq!((a, b), (reserve_a, reserve_b));
        }
    }
}
