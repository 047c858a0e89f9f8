use capval_core::valuation::{capm, dcf, sensitivity, wacc};
use capval_core::ValuationError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Cost of capital
// ===========================================================================

fn sample_structure() -> wacc::CapitalStructureInput {
    wacc::CapitalStructureInput {
        cost_of_equity: dec!(0.145),
        cost_of_debt_pretax: dec!(0.075),
        tax_rate: dec!(0.25),
        target_debt_fraction: dec!(0.25),
        current_debt_fraction: Decimal::ZERO,
    }
}

#[test]
fn test_wacc_reference_scenario() {
    // Ke=14.5%, Kd=7.5% pre-tax, t=25%, target 25% debt
    // Kd_at = 0.075 * 0.75 = 0.05625
    // WACC  = 0.75 * 0.145 + 0.25 * 0.05625 = 0.1228125
    let result = wacc::compute_cost_of_capital(&sample_structure()).unwrap();
    let out = &result.result;

    assert_eq!(out.after_tax_cost_of_debt, dec!(0.05625));
    assert_eq!(out.wacc_target, dec!(0.1228125));
    assert_eq!(out.wacc_current, dec!(0.145));
}

#[test]
fn test_wacc_endpoints_are_exact() {
    let mut input = sample_structure();

    input.target_debt_fraction = Decimal::ZERO;
    let all_equity = wacc::compute_cost_of_capital(&input).unwrap().result;
    assert_eq!(all_equity.wacc_target, input.cost_of_equity);

    input.target_debt_fraction = Decimal::ONE;
    let all_debt = wacc::compute_cost_of_capital(&input).unwrap().result;
    assert_eq!(all_debt.wacc_target, all_debt.after_tax_cost_of_debt);
}

#[test]
fn test_wacc_convexity_across_debt_fractions() {
    let mut w = Decimal::ZERO;
    while w <= Decimal::ONE {
        let mut input = sample_structure();
        input.target_debt_fraction = w;
        let out = wacc::compute_cost_of_capital(&input).unwrap().result;

        let lo = out.after_tax_cost_of_debt.min(input.cost_of_equity);
        let hi = out.after_tax_cost_of_debt.max(input.cost_of_equity);
        assert!(
            out.wacc_target >= lo && out.wacc_target <= hi,
            "WACC {} escapes [{lo}, {hi}] at debt fraction {w}",
            out.wacc_target
        );
        w += dec!(0.05);
    }
}

#[test]
fn test_wacc_leverage_lowers_cost_of_capital_when_debt_is_cheaper() {
    // With after-tax debt cheaper than equity, moving from 0% to 25% debt
    // must reduce the blended rate.
    let result = wacc::compute_cost_of_capital(&sample_structure()).unwrap();
    assert!(result.result.wacc_target < result.result.wacc_current);
}

#[test]
fn test_wacc_rejects_out_of_range_fractions() {
    let mut input = sample_structure();
    input.tax_rate = dec!(1.5);
    assert!(wacc::compute_cost_of_capital(&input).is_err());

    let mut input = sample_structure();
    input.target_debt_fraction = dec!(-0.1);
    assert!(wacc::compute_cost_of_capital(&input).is_err());

    let mut input = sample_structure();
    input.current_debt_fraction = dec!(1.1);
    assert!(wacc::compute_cost_of_capital(&input).is_err());
}

// ===========================================================================
// Discounted cash flows
// ===========================================================================

#[test]
fn test_dcf_reference_scenario() {
    // [10, 20, 30] at 10% against 5 up front
    let result = dcf::discount_cash_flows(&[dec!(10), dec!(20), dec!(30)], dec!(0.10), dec!(5))
        .unwrap();
    let out = &result.result;

    let expected_pvs = [dec!(9.0909), dec!(16.5289), dec!(22.5394)];
    assert_eq!(out.present_values.len(), 3);
    for (pv, exp) in out.present_values.iter().zip(expected_pvs) {
        assert!(
            (pv - exp).abs() < dec!(0.0001),
            "Expected PV ~{exp}, got {pv}"
        );
    }
    assert!((out.total_present_value - dec!(48.1592)).abs() < dec!(0.0001));
    assert!((out.net_present_value - dec!(43.1592)).abs() < dec!(0.0001));
}

#[test]
fn test_dcf_zero_rate_is_plain_sum() {
    let result = dcf::discount_cash_flows(&[dec!(10), dec!(20), dec!(30)], Decimal::ZERO, dec!(5))
        .unwrap();
    assert_eq!(result.result.total_present_value, dec!(60));
    assert_eq!(result.result.net_present_value, dec!(55));
}

#[test]
fn test_dcf_degenerate_rate() {
    let result = dcf::discount_cash_flows(&[dec!(10), dec!(20)], dec!(-1), dec!(5));
    assert!(matches!(result, Err(ValuationError::DegenerateRate { .. })));
}

#[test]
fn test_dcf_superposition() {
    let rate = dec!(0.10);
    let whole = dcf::discount_cash_flows(&[dec!(10), dec!(20), dec!(30)], rate, Decimal::ZERO)
        .unwrap()
        .result
        .total_present_value;

    let split: Decimal = [
        [dec!(10), dec!(0), dec!(0)],
        [dec!(0), dec!(20), dec!(0)],
        [dec!(0), dec!(0), dec!(30)],
    ]
    .iter()
    .map(|flows| {
        dcf::discount_cash_flows(flows, rate, Decimal::ZERO)
            .unwrap()
            .result
            .total_present_value
    })
    .sum();

    assert_eq!(whole, split);
}

#[test]
fn test_npv_monotone_in_rate_for_non_negative_flows() {
    let flows = [dec!(0), dec!(25), dec!(40), dec!(0), dec!(15)];
    let mut prev = dcf::net_present_value(&flows, Decimal::ZERO, dec!(30)).unwrap();
    let mut rate = dec!(0.01);
    while rate <= dec!(0.30) {
        let npv = dcf::net_present_value(&flows, rate, dec!(30)).unwrap();
        assert!(
            npv <= prev,
            "NPV must not increase with the rate: {prev} -> {npv} at {rate}"
        );
        prev = npv;
        rate += dec!(0.01);
    }
}

// ===========================================================================
// Sensitivity sweep and break-even
// ===========================================================================

#[test]
fn test_sweep_over_reference_range_is_strictly_decreasing() {
    let rates = sensitivity::generate_rates(dec!(0.06), dec!(0.15), dec!(0.01)).unwrap();
    let result =
        sensitivity::sweep_sensitivity(&[dec!(10), dec!(20), dec!(30)], dec!(5), &rates).unwrap();
    let points = &result.result.points;

    assert_eq!(points.len(), rates.len());
    for (point, rate) in points.iter().zip(&rates) {
        assert_eq!(point.rate, *rate);
    }
    for pair in points.windows(2) {
        assert!(pair[0].net_present_value > pair[1].net_present_value);
    }
}

#[test]
fn test_sweep_matches_single_evaluations() {
    let flows = [dec!(10), dec!(20), dec!(30)];
    let rates = [dec!(0.06), dec!(0.10), dec!(0.14)];
    let curve = sensitivity::sweep_sensitivity(&flows, dec!(5), &rates).unwrap();

    for point in &curve.result.points {
        let single = dcf::discount_cash_flows(&flows, point.rate, dec!(5)).unwrap();
        assert_eq!(point.net_present_value, single.result.net_present_value);
    }
}

#[test]
fn test_breakeven_sits_between_sweep_sign_change() {
    // 50/yr for 3 years against 120: NPV positive at 10%, negative at 14%
    let flows = [dec!(50), dec!(50), dec!(50)];
    let npv_low = dcf::net_present_value(&flows, dec!(0.10), dec!(120)).unwrap();
    let npv_high = dcf::net_present_value(&flows, dec!(0.14), dec!(120)).unwrap();
    assert!(npv_low > Decimal::ZERO && npv_high < Decimal::ZERO);

    let result =
        sensitivity::find_breakeven_rate(&flows, dec!(120), dec!(0.10), dec!(0.14)).unwrap();
    let rate = result.result.breakeven_rate;
    assert!(rate > dec!(0.10) && rate < dec!(0.14));
    assert!(result.result.npv_at_breakeven.abs() < dec!(0.001));
}

// ===========================================================================
// CAPM helpers
// ===========================================================================

#[test]
fn test_capm_feeds_cost_of_capital() {
    // Build Ke from CAPM, then price the target structure with it.
    let ke = capm::cost_of_equity_capm(dec!(0.07), dec!(0.91), dec!(0.08));
    let input = wacc::CapitalStructureInput {
        cost_of_equity: ke,
        cost_of_debt_pretax: dec!(0.075),
        tax_rate: dec!(0.25),
        target_debt_fraction: dec!(0.25),
        current_debt_fraction: Decimal::ZERO,
    };
    let result = wacc::compute_cost_of_capital(&input).unwrap();
    // 0.75 * 0.1428 + 0.25 * 0.05625 = 0.1071 + 0.0140625 = 0.1211625
    assert_eq!(result.result.wacc_target, dec!(0.1211625));
}

#[test]
fn test_relever_from_target_debt_fraction() {
    // Relever an asset beta to the same 25% debt target the WACC input uses.
    let de = capm::debt_fraction_to_debt_equity(dec!(0.25)).unwrap();
    let beta_l = capm::relever_beta(dec!(0.85), dec!(0.25), de);
    // D/E = 1/3, Beta_L = 0.85 * (1 + 0.75/3) = 0.85 * 1.25 = 1.0625
    assert!((beta_l - dec!(1.0625)).abs() < dec!(0.0000001));
}
