use rust_decimal::Decimal;

use crate::error::ValuationError;
use crate::types::{Multiple, Rate};
use crate::ValuationResult;

/// CAPM cost of equity: Ke = Rf + Beta * ERP.
pub fn cost_of_equity_capm(risk_free_rate: Rate, beta: Decimal, equity_risk_premium: Rate) -> Rate {
    risk_free_rate + beta * equity_risk_premium
}

/// Re-lever a beta using the Hamada equation.
///
/// Beta_L = Beta_U * (1 + (1 - t) * D/E)
pub fn relever_beta(unlevered_beta: Decimal, tax_rate: Rate, debt_equity: Multiple) -> Decimal {
    unlevered_beta * (Decimal::ONE + (Decimal::ONE - tax_rate) * debt_equity)
}

/// Unlever a beta using the Hamada equation.
///
/// Beta_U = Beta_L / (1 + (1 - t) * D/E)
pub fn unlever_beta(
    levered_beta: Decimal,
    tax_rate: Rate,
    debt_equity: Multiple,
) -> ValuationResult<Decimal> {
    let denom = Decimal::ONE + (Decimal::ONE - tax_rate) * debt_equity;
    if denom.is_zero() {
        return Err(ValuationError::DivisionByZero {
            context: "Hamada unlever denominator".into(),
        });
    }
    Ok(levered_beta / denom)
}

/// Convert a debt fraction of total capital (D/V) into a debt-to-equity
/// ratio (D/E), so relevering can start from the same debt fraction the
/// WACC input uses.
pub fn debt_fraction_to_debt_equity(debt_fraction: Rate) -> ValuationResult<Multiple> {
    let equity_fraction = Decimal::ONE - debt_fraction;
    if equity_fraction.is_zero() {
        return Err(ValuationError::DivisionByZero {
            context: "D/V to D/E conversion at 100% debt".into(),
        });
    }
    Ok(debt_fraction / equity_fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_capm_cost_of_equity() {
        // Ke = 0.07 + 0.91 * 0.08 = 0.1428
        let ke = cost_of_equity_capm(dec!(0.07), dec!(0.91), dec!(0.08));
        assert_eq!(ke, dec!(0.1428));
    }

    #[test]
    fn test_relever_beta() {
        // Beta_L = 0.80 * (1 + 0.75 * 0.5) = 0.80 * 1.375 = 1.10
        let beta_l = relever_beta(dec!(0.80), dec!(0.25), dec!(0.5));
        assert_eq!(beta_l, dec!(1.10));
    }

    #[test]
    fn test_unlever_relever_roundtrip() {
        let beta_l = dec!(1.20);
        let tax = dec!(0.25);
        let de = dec!(0.40);

        let beta_u = unlever_beta(beta_l, tax, de).unwrap();
        let beta_l_back = relever_beta(beta_u, tax, de);

        assert!(
            (beta_l - beta_l_back).abs() < dec!(0.00001),
            "Round-trip failed: {beta_l} -> {beta_u} -> {beta_l_back}"
        );
    }

    #[test]
    fn test_unlever_degenerate_denominator() {
        // 1 + (1 - 0) * (-1) = 0
        let result = unlever_beta(dec!(1.0), Decimal::ZERO, dec!(-1));
        assert!(matches!(result, Err(ValuationError::DivisionByZero { .. })));
    }

    #[test]
    fn test_debt_fraction_to_debt_equity() {
        // 25% debt => D/E = 0.25 / 0.75 = 1/3
        let de = debt_fraction_to_debt_equity(dec!(0.25)).unwrap();
        assert!((de - dec!(0.3333333333)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_all_debt_fraction_rejected() {
        assert!(debt_fraction_to_debt_equity(Decimal::ONE).is_err());
    }
}
