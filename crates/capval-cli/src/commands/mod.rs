pub mod sensitivity;
pub mod valuation;

use capval_core::valuation::dcf;
use rust_decimal::Decimal;

/// Parse a comma-separated decimal list ("10,20,30").
pub fn parse_decimal_list(raw: &str) -> Result<Vec<Decimal>, Box<dyn std::error::Error>> {
    let values: Result<Vec<Decimal>, _> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<Decimal>()
                .map_err(|e| format!("Invalid decimal '{s}': {e}"))
        })
        .collect();
    let values = values?;
    if values.is_empty() {
        return Err("Expected at least one value in the list".into());
    }
    Ok(values)
}

/// The initial investment is either given outright or estimated from
/// first-period capex via the engine's documented fallback policy.
pub fn resolve_initial_investment(
    explicit: Option<Decimal>,
    first_period_capex: Option<Decimal>,
) -> Result<Decimal, Box<dyn std::error::Error>> {
    match (explicit, first_period_capex) {
        (Some(value), _) => Ok(value),
        (None, Some(capex)) => Ok(dcf::estimate_initial_investment(capex)),
        (None, None) => {
            Err("--initial-investment is required (or provide --capex to estimate it)".into())
        }
    }
}
