use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ValuationError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::ValuationResult;

/// Multiple applied to first-period capex by `estimate_initial_investment`.
pub const CAPEX_ESTIMATE_MULTIPLE: Decimal = dec!(1.5);

/// Output of discounting a free-cash-flow series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountedValuationOutput {
    /// Present value of each period's cash flow, in period order
    pub present_values: Vec<Money>,
    /// Sum of the present values
    pub total_present_value: Money,
    /// Up-front outlay supplied by the caller
    pub initial_investment: Money,
    /// Total present value less the initial investment
    pub net_present_value: Money,
}

/// Discount an ordered FCFF series at a single rate.
///
/// End-of-period convention: the cash flow of period n is discounted by
/// (1 + rate)^n with n starting at 1, so the first flow is already one
/// full period out. A zero exponent on the first period is a different
/// convention and is deliberately not supported.
///
/// The engine reports the signed NPV only; whether a given NPV clears an
/// acceptance threshold is the caller's policy.
pub fn discount_cash_flows(
    cash_flows: &[Money],
    rate: Rate,
    initial_investment: Money,
) -> ValuationResult<ComputationOutput<DiscountedValuationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let present_values = present_values_at(cash_flows, rate)?;
    if rate < dec!(-1) {
        warnings.push(format!(
            "Rate {rate} is below -100%; discount factors alternate in sign"
        ));
    }

    let total_present_value: Money = present_values.iter().copied().sum();
    let net_present_value = total_present_value - initial_investment;

    let output = DiscountedValuationOutput {
        present_values,
        total_present_value,
        initial_investment,
        net_present_value,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "End-of-period FCFF discounting",
        &serde_json::json!({
            "periods": cash_flows.len(),
            "rate": rate.to_string(),
            "initial_investment": initial_investment.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Net present value at a single rate. Same discounting convention as
/// `discount_cash_flows`, without the result envelope.
pub fn net_present_value(
    cash_flows: &[Money],
    rate: Rate,
    initial_investment: Money,
) -> ValuationResult<Money> {
    let present_values = present_values_at(cash_flows, rate)?;
    Ok(present_values.iter().copied().sum::<Decimal>() - initial_investment)
}

/// Fallback initial-investment policy carried over from the surrounding
/// application: 1.5x the first period's capital expenditure. Callers that
/// know the real outlay should pass it to the evaluator directly; the
/// evaluator itself never applies this estimate.
pub fn estimate_initial_investment(first_period_capex: Money) -> Money {
    first_period_capex * CAPEX_ESTIMATE_MULTIPLE
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn present_values_at(cash_flows: &[Money], rate: Rate) -> ValuationResult<Vec<Money>> {
    if cash_flows.is_empty() {
        return Err(ValuationError::InsufficientData(
            "Cash-flow series must contain at least one period".into(),
        ));
    }
    if rate == dec!(-1) {
        return Err(ValuationError::DegenerateRate { rate });
    }

    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;
    let mut present_values = Vec::with_capacity(cash_flows.len());

    for (idx, cf) in cash_flows.iter().enumerate() {
        // Period idx+1 factor: multiply before dividing so the first flow
        // carries (1+r)^1.
        discount *= one_plus_r;
        if discount.is_zero() {
            return Err(ValuationError::DivisionByZero {
                context: format!("discount factor at period {}", idx + 1),
            });
        }
        present_values.push(cf / discount);
    }

    Ok(present_values)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
