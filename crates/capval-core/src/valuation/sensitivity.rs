use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ValuationError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::ValuationResult;

use super::dcf::{discount_cash_flows, net_present_value};

const NPV_CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const RATE_TOLERANCE: Decimal = dec!(0.0000001);
const MAX_BISECTION_ITERATIONS: u32 = 100;

/// One point on the NPV-versus-rate curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateNpvPoint {
    pub rate: Rate,
    pub net_present_value: Money,
}

/// NPV evaluated across a set of candidate discount rates, in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityCurve {
    pub points: Vec<RateNpvPoint>,
}

/// Output of the break-even rate search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakevenOutput {
    /// Discount rate at which NPV crosses zero
    pub breakeven_rate: Rate,
    /// Residual NPV at the returned rate
    pub npv_at_breakeven: Money,
    /// Bisection iterations consumed
    pub iterations: u32,
    pub bracket_low: Rate,
    pub bracket_high: Rate,
}

/// Re-run the DCF evaluator once per candidate rate, holding cash flows and
/// initial investment fixed. Output order matches the input rate order.
///
/// Fails fast: a degenerate rate anywhere in the list fails the whole sweep.
pub fn sweep_sensitivity(
    cash_flows: &[Money],
    initial_investment: Money,
    rates: &[Rate],
) -> ValuationResult<ComputationOutput<SensitivityCurve>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if rates.is_empty() {
        return Err(ValuationError::InsufficientData(
            "Sensitivity sweep requires at least one candidate rate".into(),
        ));
    }

    let mut points = Vec::with_capacity(rates.len());
    for &rate in rates {
        let valuation = discount_cash_flows(cash_flows, rate, initial_investment)?;
        warnings.extend(valuation.warnings);
        points.push(RateNpvPoint {
            rate,
            net_present_value: valuation.result.net_present_value,
        });
    }

    let output = SensitivityCurve { points };
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "NPV sensitivity sweep over discount rates",
        &serde_json::json!({
            "periods": cash_flows.len(),
            "initial_investment": initial_investment.to_string(),
            "candidate_rates": rates.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Generate candidate rates from min to max with a positive step.
/// Max is always included, even when the step overshoots it.
pub fn generate_rates(min: Rate, max: Rate, step: Rate) -> ValuationResult<Vec<Rate>> {
    if step <= Decimal::ZERO {
        return Err(ValuationError::InvalidInput {
            field: "step".into(),
            reason: "Step must be positive".into(),
        });
    }
    if min > max {
        return Err(ValuationError::InvalidInput {
            field: "min".into(),
            reason: "Min must be <= max".into(),
        });
    }

    let mut values = Vec::new();
    let mut current = min;
    while current <= max {
        values.push(current);
        current += step;
    }
    if let Some(&last) = values.last() {
        if last < max {
            values.push(max);
        }
    }

    Ok(values)
}

/// Locate the rate at which NPV crosses zero, by bisection over [low, high].
///
/// Valid because NPV is monotonically non-increasing in the rate for any
/// non-negative cash-flow series; the bracket endpoints must straddle zero.
pub fn find_breakeven_rate(
    cash_flows: &[Money],
    initial_investment: Money,
    low: Rate,
    high: Rate,
) -> ValuationResult<ComputationOutput<BreakevenOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    if low >= high {
        return Err(ValuationError::InvalidInput {
            field: "low".into(),
            reason: format!("Bracket low ({low}) must be below high ({high})"),
        });
    }

    let mut lo = low;
    let mut hi = high;
    let mut npv_lo = net_present_value(cash_flows, lo, initial_investment)?;
    let npv_hi = net_present_value(cash_flows, hi, initial_investment)?;

    // An endpoint may already sit on the root.
    if npv_lo.abs() < NPV_CONVERGENCE_THRESHOLD {
        return Ok(breakeven_envelope(low, high, lo, npv_lo, 0, warnings, start));
    }
    if npv_hi.abs() < NPV_CONVERGENCE_THRESHOLD {
        return Ok(breakeven_envelope(low, high, hi, npv_hi, 0, warnings, start));
    }

    if npv_lo.is_sign_positive() == npv_hi.is_sign_positive() {
        return Err(ValuationError::FinancialImpossibility(format!(
            "NPV does not change sign over [{low}, {high}] (NPV {npv_lo} to {npv_hi}); no break-even rate in bracket"
        )));
    }

    let mut last_npv = npv_lo;
    for i in 0..MAX_BISECTION_ITERATIONS {
        let mid = (lo + hi) / dec!(2);
        let npv_mid = net_present_value(cash_flows, mid, initial_investment)?;
        last_npv = npv_mid;

        if npv_mid.abs() < NPV_CONVERGENCE_THRESHOLD || (hi - lo) / dec!(2) < RATE_TOLERANCE {
            return Ok(breakeven_envelope(low, high, mid, npv_mid, i + 1, warnings, start));
        }

        if npv_mid.is_sign_positive() == npv_lo.is_sign_positive() {
            lo = mid;
            npv_lo = npv_mid;
        } else {
            hi = mid;
        }
    }

    Err(ValuationError::ConvergenceFailure {
        function: "find_breakeven_rate".into(),
        iterations: MAX_BISECTION_ITERATIONS,
        last_delta: last_npv,
    })
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn breakeven_envelope(
    bracket_low: Rate,
    bracket_high: Rate,
    rate: Rate,
    npv: Money,
    iterations: u32,
    warnings: Vec<String>,
    start: Instant,
) -> ComputationOutput<BreakevenOutput> {
    let output = BreakevenOutput {
        breakeven_rate: rate,
        npv_at_breakeven: npv,
        iterations,
        bracket_low,
        bracket_high,
    };
    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Break-even discount rate via bisection",
        &serde_json::json!({
            "bracket_low": bracket_low.to_string(),
            "bracket_high": bracket_high.to_string(),
        }),
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
