//! Fast unit tests for the market
//! Run with: cargo test

use spotlend::*;

const E18: u128 = 1_000_000_000_000_000_000;

fn attacker() -> Address {
    Address::new("attacker")
}

fn pair() -> Address {
    Address::new(PAIR)
}

fn pool() -> Address {
    Address::new(POOL)
}

fn market() -> Market {
    Market::new(&MarketParams::deployment()).unwrap()
}

/// Market with an extra honest user "lp" holding 500 DVT / 50 WETH
fn market_with_lp() -> (Market, Address) {
    let mut params = MarketParams::deployment();
    params.accounts.push(AccountParams {
        name: "lp".to_string(),
        balance_a: 500 * E18,
        balance_b: 50 * E18,
    });
    (Market::new(&params).unwrap(), Address::new("lp"))
}

#[test]
fn test_deployment_sanity() {
    let market = market();
    assert_eq!(market.deposit_required(E18).unwrap(), 3 * E18 / 10);
    assert_eq!(market.deposit_required(1_000_000 * E18).unwrap(), 300_000 * E18);
    assert_eq!(market.balance_of(Asset::A, &pool()), 1_000_000 * E18);
    assert_eq!(market.balance_of(Asset::A, &attacker()), 10_000 * E18);
    assert_eq!(market.balance_of(Asset::B, &attacker()), 20 * E18);
    assert_eq!(market.token(Asset::A).symbol, "DVT");
    assert_eq!(market.token(Asset::B).symbol, "WETH");
}

#[test]
fn test_borrow_then_repay_restores_balances() {
    let mut market = market();
    let me = attacker();
    market.approve(&me, Asset::B, &pool(), u128::MAX).unwrap();
    market.approve(&me, Asset::A, &pool(), u128::MAX).unwrap();

    let borrowed = market.borrow(&me, 10 * E18).unwrap();
    assert_eq!(borrowed.deposited, 3 * E18);
    assert_eq!(market.balance_of(Asset::B, &me), 17 * E18);
    assert_eq!(
        market.position(&me),
        Some(Position {
            debt: 10 * E18,
            collateral: 3 * E18
        })
    );

    let repaid = market.repay(&me, 10 * E18).unwrap();
    assert!(repaid.closed);
    assert_eq!(market.position(&me), None);
    assert_eq!(market.balance_of(Asset::B, &me), 20 * E18);
    assert_eq!(market.balance_of(Asset::A, &me), 10_000 * E18);
    assert_eq!(market.pool().total_debt(), 0);
    assert_eq!(market.pool().total_collateral(), 0);
}

#[test]
fn test_second_borrow_prices_at_current_spot() {
    let mut market = market();
    let me = attacker();
    market.approve(&me, Asset::B, &pool(), u128::MAX).unwrap();
    market.borrow(&me, 10 * E18).unwrap();
    market.borrow(&me, 20 * E18).unwrap();

    assert_eq!(
        market.position(&me),
        Some(Position {
            debt: 30 * E18,
            collateral: 9 * E18
        })
    );
}

#[test]
fn test_failed_borrow_changes_nothing() {
    let mut market = market();
    let me = attacker();
    market.approve(&me, Asset::B, &pool(), u128::MAX).unwrap();
    let before = market.clone();

    // 100 DVT needs 30 WETH; attacker has 20
    let err = market.borrow(&me, 100 * E18).unwrap_err();
    assert_eq!(
        err.source,
        CoreError::InsufficientCollateral {
            required: 30 * E18,
            available: 20 * E18
        }
    );
    assert_eq!(market, before);
}

#[test]
fn test_borrow_more_than_pool_holds() {
    let mut market = market();
    let err = market.borrow(&attacker(), 1_000_001 * E18).unwrap_err();
    assert_eq!(err.source, CoreError::InsufficientLiquidity);
}

#[test]
fn test_borrow_without_allowance() {
    let mut market = market();
    let err = market.borrow(&attacker(), E18).unwrap_err();
    assert!(matches!(err.source, CoreError::CollateralTransferFailed(_)));
    assert_eq!(market.position(&attacker()), None);
}

#[test]
fn test_repay_without_allowance() {
    let mut market = market();
    let me = attacker();
    market.approve(&me, Asset::B, &pool(), u128::MAX).unwrap();
    market.borrow(&me, E18).unwrap();
    let before = market.clone();

    let err = market.repay(&me, E18).unwrap_err();
    assert!(matches!(err.source, CoreError::RepaymentTransferFailed(_)));
    assert_eq!(market, before);
}

#[test]
fn test_repay_without_position() {
    let mut market = market();
    let err = market.repay(&attacker(), E18).unwrap_err();
    assert_eq!(
        err.source,
        CoreError::DebtExceeded {
            requested: E18,
            outstanding: 0
        }
    );
}

#[test]
fn test_swap_grows_invariant() {
    let mut market = market();
    let me = attacker();
    market.approve(&me, Asset::A, &pair(), u128::MAX).unwrap();
    let k0 = market.pair().invariant();

    market.swap(&me, Asset::A, 5 * E18, 1).unwrap();
    let k1 = market.pair().invariant();
    assert!(k1 > k0);
}

#[test]
fn test_swap_exact_out_matches_quote() {
    let mut market = market();
    let me = attacker();
    market.approve(&me, Asset::B, &pair(), u128::MAX).unwrap();

    let quote = market.pair().quote_in(Asset::B, 50 * E18).unwrap();
    let receipt = market.swap_exact_out(&me, Asset::B, 50 * E18, quote.amount_in).unwrap();
    assert_eq!(receipt.amount_in, quote.amount_in);
    assert_eq!(market.balance_of(Asset::A, &me), 10_050 * E18);
    assert_eq!(market.pair().reserve(Asset::A), 50 * E18);
}

#[test]
fn test_swap_slippage_rolls_back() {
    let mut market = market();
    let me = attacker();
    market.approve(&me, Asset::A, &pair(), u128::MAX).unwrap();
    let before = market.clone();

    let err = market.swap(&me, Asset::A, E18, E18).unwrap_err();
    assert_eq!(err.source, CoreError::SlippageExceeded);
    assert_eq!(market, before);
}

#[test]
fn test_liquidity_round_trip() {
    let (mut market, lp) = market_with_lp();
    market.approve(&lp, Asset::A, &pair(), u128::MAX).unwrap();
    market.approve(&lp, Asset::B, &pair(), u128::MAX).unwrap();

    let receipt = market.add_liquidity(&lp, 100 * E18, 50 * E18, 0, 0).unwrap();
    assert_eq!(receipt.amount_a, 100 * E18);
    assert_eq!(receipt.amount_b, 10 * E18);
    assert_eq!(market.pair().get_reserves(), (200 * E18, 20 * E18));
    assert_eq!(market.balance_of(Asset::B, &lp), 40 * E18);

    let (out_a, out_b) = market.remove_liquidity(&lp, receipt.shares).unwrap();
    assert!(out_a <= 100 * E18 && out_a > 100 * E18 - 10);
    assert!(out_b <= 10 * E18 && out_b > 10 * E18 - 10);
    assert_eq!(market.pair().shares_of(&lp), 0);
}

#[test]
fn test_liquidity_min_amounts() {
    let (mut market, lp) = market_with_lp();
    market.approve(&lp, Asset::A, &pair(), u128::MAX).unwrap();
    market.approve(&lp, Asset::B, &pair(), u128::MAX).unwrap();

    let err = market
        .add_liquidity(&lp, 100 * E18, 50 * E18, 0, 20 * E18)
        .unwrap_err();
    assert_eq!(err.source, CoreError::SlippageExceeded);
}

#[test]
fn test_remove_more_shares_than_held() {
    let (mut market, lp) = market_with_lp();
    let err = market.remove_liquidity(&lp, 1).unwrap_err();
    assert_eq!(err.source, CoreError::InsufficientShares { requested: 1, held: 0 });
}

#[test]
fn test_seed_lock_survives_full_withdrawal() {
    let mut market = market();
    let deployer = Address::new(DEPLOYER);
    let held = market.pair().shares_of(&deployer);
    market.remove_liquidity(&deployer, held).unwrap();
    let reserves = market.pair().get_reserves();
    assert!(reserves.0 > 0 && reserves.1 > 0);

    let err = market.remove_liquidity(&Address::zero(), 1_000).unwrap_err();
    assert_eq!(err.source, CoreError::LockedLiquidity);
    assert_eq!(market.pair().get_reserves(), reserves);
    assert_eq!(market.pair().total_shares(), 1_000);
}

#[test]
fn test_transfer_op() {
    let (mut market, lp) = market_with_lp();
    market.transfer(Asset::B, &attacker(), &lp, 5 * E18).unwrap();
    assert_eq!(market.balance_of(Asset::B, &lp), 55 * E18);

    let err = market.transfer(Asset::B, &attacker(), &lp, 100 * E18).unwrap_err();
    assert!(matches!(err.source, CoreError::Token(TokenError::InsufficientBalance { .. })));
}

#[test]
fn test_journal_records_applied_ops() {
    let mut market = market();
    let me = attacker();
    let start = market.events().len();

    market.approve(&me, Asset::A, &pair(), u128::MAX).unwrap();
    market.swap(&me, Asset::A, E18, 1).unwrap();
    // Rejected ops leave no trace
    let _ = market.swap(&me, Asset::A, 0, 0);

    let events = &market.events()[start..];
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], Event::Approval { .. }));
    assert!(matches!(events[1], Event::Swap { amount_in, .. } if amount_in == E18));
}

#[test]
fn test_unit_reports_failing_index() {
    let mut market = market();
    let me = attacker();
    let unit = AtomicUnit::new()
        .then(Op::Approve {
            owner: me.clone(),
            asset: Asset::B,
            spender: pool(),
            amount: u128::MAX,
        })
        .then(Op::Borrow {
            borrower: me.clone(),
            amount: E18,
        })
        .then(Op::Repay {
            borrower: me.clone(),
            amount: E18,
        });
    let before = market.clone();

    // Repay has no DVT allowance
    let err = market.execute(&unit).unwrap_err();
    assert_eq!(err.index, 2);
    assert!(matches!(err.source, CoreError::RepaymentTransferFailed(_)));
    assert_eq!(market, before);
}

#[test]
fn test_unit_commits_all_ops() {
    let mut market = market();
    let me = attacker();
    let unit: AtomicUnit = vec![
        Op::Approve {
            owner: me.clone(),
            asset: Asset::B,
            spender: pool(),
            amount: u128::MAX,
        },
        Op::Approve {
            owner: me.clone(),
            asset: Asset::A,
            spender: pool(),
            amount: u128::MAX,
        },
        Op::Borrow {
            borrower: me.clone(),
            amount: E18,
        },
        Op::Repay {
            borrower: me.clone(),
            amount: E18,
        },
    ]
    .into();

    let outcomes = market.execute(&unit).unwrap();
    assert_eq!(outcomes[0], Outcome::Approved);
    assert!(matches!(outcomes[3], Outcome::Repaid(r) if r.closed));
    assert_eq!(market.balance_of(Asset::B, &me), 20 * E18);
}

#[test]
fn test_health_after_price_moves() {
    let mut market = market();
    let me = attacker();
    market.approve(&me, Asset::B, &pool(), u128::MAX).unwrap();
    market.approve(&me, Asset::B, &pair(), u128::MAX).unwrap();
    market.borrow(&me, 10 * E18).unwrap();

    // Buying DVT raises its price; posted collateral no longer covers 3x
    market.swap(&me, Asset::B, 5 * E18, 1).unwrap();
    let health = market.health(&me).unwrap().unwrap();
    assert!(health.ratio_bps < 10_000);
    assert!(health.required_now > health.collateral);
}
