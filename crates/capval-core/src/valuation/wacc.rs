use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ValuationError;
use crate::types::{with_metadata, ComputationOutput, Rate};
use crate::ValuationResult;

/// Input parameters for the cost-of-capital calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalStructureInput {
    /// Cost of equity (e.g. 0.145 for 14.5%)
    pub cost_of_equity: Rate,
    /// Pre-tax cost of debt
    pub cost_of_debt_pretax: Rate,
    /// Marginal corporate tax rate
    pub tax_rate: Rate,
    /// Debt share of the target capital structure (market value basis)
    pub target_debt_fraction: Rate,
    /// Debt share of the current capital structure. Defaults to zero,
    /// i.e. an all-equity balance sheet.
    #[serde(default)]
    pub current_debt_fraction: Rate,
}

/// Output of the cost-of-capital calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostOfCapitalOutput {
    /// After-tax cost of debt: Kd * (1 - t)
    pub after_tax_cost_of_debt: Rate,
    /// WACC at the current capital structure
    pub wacc_current: Rate,
    /// WACC at the target capital structure
    pub wacc_target: Rate,
}

/// Calculate the weighted average cost of capital at the current and
/// target capital structures.
///
/// After-tax cost of debt: Kd_at = Kd * (1 - t)
/// WACC at debt fraction w: (1 - w) * Ke + w * Kd_at
///
/// Both blends are convex combinations, so each WACC lies between the
/// after-tax cost of debt and the cost of equity inclusive.
pub fn compute_cost_of_capital(
    input: &CapitalStructureInput,
) -> ValuationResult<ComputationOutput<CostOfCapitalOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let after_tax_cost_of_debt = input.cost_of_debt_pretax * (Decimal::ONE - input.tax_rate);

    let wacc_current = blend(
        input.cost_of_equity,
        after_tax_cost_of_debt,
        input.current_debt_fraction,
    );
    let wacc_target = blend(
        input.cost_of_equity,
        after_tax_cost_of_debt,
        input.target_debt_fraction,
    );

    if input.target_debt_fraction > dec!(0.90) {
        warnings.push(format!(
            "Target debt fraction ({}) exceeds 90%; distressed-level leverage",
            input.target_debt_fraction
        ));
    }
    if wacc_target > dec!(0.20) {
        warnings.push(format!(
            "Target WACC of {wacc_target} exceeds 20%; appropriate for high-risk situations only"
        ));
    }

    let output = CostOfCapitalOutput {
        after_tax_cost_of_debt,
        wacc_current,
        wacc_target,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "WACC at current and target capital structures",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// WACC at a given debt fraction: (1 - w) * Ke + w * Kd_at.
fn blend(cost_of_equity: Rate, after_tax_cost_of_debt: Rate, debt_fraction: Rate) -> Rate {
    (Decimal::ONE - debt_fraction) * cost_of_equity + debt_fraction * after_tax_cost_of_debt
}

fn validate_input(input: &CapitalStructureInput) -> ValuationResult<()> {
    if input.cost_of_equity < Decimal::ZERO {
        return Err(ValuationError::InvalidInput {
            field: "cost_of_equity".into(),
            reason: "Cost of equity cannot be negative".into(),
        });
    }
    if input.cost_of_debt_pretax < Decimal::ZERO {
        return Err(ValuationError::InvalidInput {
            field: "cost_of_debt_pretax".into(),
            reason: "Pre-tax cost of debt cannot be negative".into(),
        });
    }
    if input.tax_rate < Decimal::ZERO || input.tax_rate > Decimal::ONE {
        return Err(ValuationError::InvalidInput {
            field: "tax_rate".into(),
            reason: "Tax rate must be between 0 and 1".into(),
        });
    }
    if input.target_debt_fraction < Decimal::ZERO || input.target_debt_fraction > Decimal::ONE {
        return Err(ValuationError::InvalidInput {
            field: "target_debt_fraction".into(),
            reason: "Target debt fraction must be between 0 and 1".into(),
        });
    }
    if input.current_debt_fraction < Decimal::ZERO || input.current_debt_fraction > Decimal::ONE {
        return Err(ValuationError::InvalidInput {
            field: "current_debt_fraction".into(),
            reason: "Current debt fraction must be between 0 and 1".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
