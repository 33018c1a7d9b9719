use slv_core::*;

/// A single position straddling the current price must pin reserves of both
/// tokens: X above the current price, Y below it.
#[test]
fn scenario_straddled_range_locks_both_tokens() {
    let pool = PoolId::new("pool-alpha");

    // Open at -10, close at +10, liquidity 1000.
    let ticks = [LiquidityTick::open(-10, 1_000), LiquidityTick::close(10, 1_000)];
    let intervals = reconstruct_intervals(&pool, &ticks).unwrap();
    assert_eq!(intervals, vec![LiquidityInterval::new(-10, 10, 1_000)]);

    // A 20-tick band is ~0.1% wide; liquidity 1000 rounds to dust. Scale the
    // position up so both legs are visibly nonzero.
    let liquidity = 1_000_000_000_000u128;
    let snapshot = PoolSnapshot {
        pool: pool.clone(),
        token_x: TokenId::new("tokx"),
        token_y: TokenId::new("toky"),
        sqrt_price_x96: Q96,
        current_tick: 0,
        fee_protocol_x: U256::zero(),
        fee_protocol_y: U256::zero(),
    };
    let intervals = [LiquidityInterval::new(-10, 10, liquidity)];

    for mode in [ComputeMode::Delegating, ComputeMode::Independent] {
        let folded = pool_requirement(&snapshot, &intervals, mode, &Q96Curve).unwrap();
        let x = folded.requirement.get(&TokenId::new("tokx"));
        let y = folded.requirement.get(&TokenId::new("toky"));

        assert!(x > U256::zero(), "{mode:?}: no token-x requirement");
        assert!(y > U256::zero(), "{mode:?}: no token-y requirement");
        // Price 1.0 sits dead center, so the two legs are near-symmetric.
        let (lo, hi) = if x < y { (x, y) } else { (y, x) };
        assert!(hi - lo <= hi / U256::from(100), "legs too lopsided: x={x} y={y}");
        assert!(folded.degraded.is_empty());
    }
}
