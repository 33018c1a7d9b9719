use slv_core::*;

/// Custody one unit short of the requirement must fail the audit with a
/// negative diff; a surplus must pass with a positive diff.
#[test]
fn scenario_shortfall_flips_verdict() {
    let mut required = ReserveRequirement::empty();
    required.add(TokenId::new("tokx"), U256::from(100));

    // 99 held against 100 required: fail, diff -1.
    let mut short = BalanceSet::empty();
    short.insert(TokenId::new("tokx"), U256::from(99));
    let report = verify_balances(&required, &short);
    assert!(!report.passed());
    assert_eq!(
        report.findings,
        vec![TokenFinding::Shortfall {
            token: TokenId::new("tokx"),
            required: U256::from(100),
            actual: U256::from(99),
            deficit: U256::from(1),
        }]
    );
    assert_eq!(report.findings[0].to_string(), "token=tokx required=100 actual=99 diff=-1");

    // 150 held against 100 required: pass, diff +50.
    let mut ample = BalanceSet::empty();
    ample.insert(TokenId::new("tokx"), U256::from(150));
    let report = verify_balances(&required, &ample);
    assert!(report.passed());
    assert_eq!(report.findings[0].to_string(), "token=tokx required=100 actual=150 diff=+50");
}
