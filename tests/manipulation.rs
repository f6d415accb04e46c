//! Spot-price manipulation against the lending pool
//! Run with: cargo test --test manipulation
//!
//! Deployment: 100 DVT : 10 WETH pair, pool lending 1,000,000 DVT at 3x,
//! attacker holding 10,000 DVT and 20 WETH.

use spotlend::*;

const E18: u128 = 1_000_000_000_000_000_000;

fn attacker() -> Address {
    Address::new("attacker")
}

fn deployment() -> Market {
    Market::new(&MarketParams::deployment()).unwrap()
}

fn drain_unit() -> AtomicUnit {
    AtomicUnit::dump_and_borrow(
        &attacker(),
        &Address::new(PAIR),
        &Address::new(POOL),
        Asset::A,
        10_000 * E18,
        1_000_000 * E18,
    )
}

#[test]
fn test_honest_price_blocks_the_drain() {
    let mut market = deployment();
    market
        .approve(&attacker(), Asset::B, &Address::new(POOL), u128::MAX)
        .unwrap();

    // At 0.1 WETH per DVT the whole pool needs 300,000 WETH
    let err = market.borrow(&attacker(), 1_000_000 * E18).unwrap_err();
    assert_eq!(
        err.source,
        CoreError::InsufficientCollateral {
            required: 300_000 * E18,
            available: 20 * E18,
        }
    );
}

#[test]
fn test_dump_lowers_spot_price() {
    let mut market = deployment();
    let before = market.spot_price(Asset::A, Asset::B).unwrap().to_wad().unwrap();
    assert_eq!(before, E18 / 10);

    market
        .approve(&attacker(), Asset::A, &Address::new(PAIR), u128::MAX)
        .unwrap();
    let receipt = market.swap(&attacker(), Asset::A, 10_000 * E18, 1).unwrap();
    assert_eq!(receipt.amount_out, 9_900_695_134_061_569_016);

    let after = market.spot_price(Asset::A, Asset::B).unwrap().to_wad().unwrap();
    assert_eq!(after, 9_832_164_944_399);
    assert!(after < before);
}

#[test]
fn test_dump_makes_borrow_cheaper() {
    let mut market = deployment();
    let honest = market.deposit_required(1_000_000 * E18).unwrap();

    market
        .approve(&attacker(), Asset::A, &Address::new(PAIR), u128::MAX)
        .unwrap();
    market.swap(&attacker(), Asset::A, 10_000 * E18, 1).unwrap();

    let manipulated = market.deposit_required(1_000_000 * E18).unwrap();
    assert_eq!(honest, 300_000 * E18);
    assert_eq!(manipulated, 29_496_494_833_197_321_981);
    assert!(manipulated < honest);
}

#[test]
fn test_drain_in_one_unit() {
    let mut market = deployment();
    let outcomes = market.execute(&drain_unit()).unwrap();
    assert_eq!(outcomes.len(), 4);

    let Outcome::Borrowed(receipt) = outcomes[3] else {
        panic!("last outcome should be the borrow, got {:?}", outcomes[3]);
    };
    assert_eq!(receipt.borrowed, 1_000_000 * E18);
    assert_eq!(receipt.deposited, 29_496_494_833_197_321_981);

    assert_eq!(market.balance_of(Asset::A, &Address::new(POOL)), 0);
    assert_eq!(market.balance_of(Asset::A, &attacker()), 1_000_000 * E18);
    assert_eq!(
        market.balance_of(Asset::B, &attacker()),
        20 * E18 + 9_900_695_134_061_569_016 - 29_496_494_833_197_321_981
    );

    // Against the reserves the attacker left behind the position looks
    // exactly covered
    let health = market.health(&attacker()).unwrap().unwrap();
    assert_eq!(health.ratio_bps, 10_000);
}

#[test]
fn test_drain_then_swap_back() {
    let mut market = deployment();
    market.execute(&drain_unit()).unwrap();

    // Buy DVT back with the remaining WETH; the loan stays outstanding
    let weth_left = market.balance_of(Asset::B, &attacker());
    market
        .approve(&attacker(), Asset::B, &Address::new(PAIR), u128::MAX)
        .unwrap();
    market.swap(&attacker(), Asset::B, weth_left, 1).unwrap();

    let price = market.spot_price(Asset::A, Asset::B).unwrap().to_wad().unwrap();
    assert!(price > 9_832_164_944_399);
    assert_eq!(market.position(&attacker()).unwrap().debt, 1_000_000 * E18);
}

#[test]
fn test_dump_borrow_and_swap_back_in_one_unit() {
    let mut market = deployment();
    let unit =
        drain_unit().then_swap(&attacker(), &Address::new(PAIR), Asset::B, 4 * E18 / 10);
    assert_eq!(unit.len(), 6);

    let outcomes = market.execute(&unit).unwrap();
    assert_eq!(outcomes.len(), 6);
    assert!(matches!(outcomes[3], Outcome::Borrowed(_)));
    assert!(matches!(outcomes[5], Outcome::Swapped(_)));

    // The buy-back lifts the price above the dumped level, so the loan is
    // now far short of what the same debt would require
    let price = market.spot_price(Asset::A, Asset::B).unwrap().to_wad().unwrap();
    assert!(price > 9_832_164_944_399);
    let health = market.health(&attacker()).unwrap().unwrap();
    assert_eq!(health.debt, 1_000_000 * E18);
    assert!(health.ratio_bps < 10_000);
    assert_eq!(market.balance_of(Asset::A, &Address::new(POOL)), 0);
}

#[test]
fn test_short_attacker_rolls_back_whole_unit() {
    let mut params = MarketParams::deployment();
    params.accounts[0].balance_b = 19 * E18;
    let mut market = Market::new(&params).unwrap();
    let before = market.clone();

    let err = market.execute(&drain_unit()).unwrap_err();
    assert_eq!(err.index, 3);
    assert!(matches!(err.source, CoreError::InsufficientCollateral { .. }));

    // The swap at index 1 succeeded but is undone with the unit
    assert_eq!(market, before);
    assert_eq!(market.pair().get_reserves(), (100 * E18, 10 * E18));
    assert_eq!(market.events(), before.events());
}
