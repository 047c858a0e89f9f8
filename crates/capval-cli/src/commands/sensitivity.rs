use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use capval_core::valuation::sensitivity;

use crate::input;

/// Arguments for the rate-sensitivity sweep
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct SweepArgs {
    /// Per-period FCFF values as a comma list (e.g. "10,20,30")
    #[arg(long)]
    pub cash_flows: Option<String>,

    /// Up-front outlay held fixed across the sweep
    #[arg(long)]
    pub initial_investment: Option<Decimal>,

    /// First-period capex; applies the 1.5x estimate when no
    /// --initial-investment is given
    #[arg(long)]
    pub capex: Option<Decimal>,

    /// Explicit candidate rates as a comma list (e.g. "0.06,0.08,0.10")
    #[arg(long, conflicts_with = "range")]
    pub rates: Option<String>,

    /// Rate range in min:max:step form (e.g. "0.06:0.15:0.01")
    #[arg(long)]
    pub range: Option<String>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the break-even rate search
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct BreakevenArgs {
    /// Per-period FCFF values as a comma list
    #[arg(long)]
    pub cash_flows: Option<String>,

    /// Up-front outlay
    #[arg(long)]
    pub initial_investment: Option<Decimal>,

    /// First-period capex; applies the 1.5x estimate when no
    /// --initial-investment is given
    #[arg(long)]
    pub capex: Option<Decimal>,

    /// Lower bracket rate
    #[arg(long, default_value = "0")]
    pub low: Decimal,

    /// Upper bracket rate
    #[arg(long, default_value = "1")]
    pub high: Decimal,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// JSON request body for `capval sweep`.
#[derive(Debug, Deserialize)]
struct SweepRequest {
    cash_flows: Vec<Decimal>,
    #[serde(default)]
    initial_investment: Option<Decimal>,
    #[serde(default)]
    first_period_capex: Option<Decimal>,
    rates: Vec<Decimal>,
}

/// JSON request body for `capval breakeven`.
#[derive(Debug, Deserialize)]
struct BreakevenRequest {
    cash_flows: Vec<Decimal>,
    #[serde(default)]
    initial_investment: Option<Decimal>,
    #[serde(default)]
    first_period_capex: Option<Decimal>,
    low: Decimal,
    high: Decimal,
}

pub fn run_sweep(args: SweepArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: SweepRequest = if let Some(ref path) = args.input {
        input::read_json(path)?
    } else if let Some(data) = input::read_piped_stdin()? {
        serde_json::from_value(data)?
    } else {
        let raw_flows = args
            .cash_flows
            .as_deref()
            .ok_or("--cash-flows is required (or provide --input)")?;
        let rates = match (args.rates.as_deref(), args.range.as_deref()) {
            (Some(list), _) => super::parse_decimal_list(list)?,
            (None, Some(spec)) => {
                let (min, max, step) = parse_rate_range(spec)?;
                sensitivity::generate_rates(min, max, step)?
            }
            (None, None) => return Err("--rates or --range is required".into()),
        };
        SweepRequest {
            cash_flows: super::parse_decimal_list(raw_flows)?,
            initial_investment: args.initial_investment,
            first_period_capex: args.capex,
            rates,
        }
    };

    let initial_investment = super::resolve_initial_investment(
        request.initial_investment,
        request.first_period_capex,
    )?;

    let result =
        sensitivity::sweep_sensitivity(&request.cash_flows, initial_investment, &request.rates)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_breakeven(args: BreakevenArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: BreakevenRequest = if let Some(ref path) = args.input {
        input::read_json(path)?
    } else if let Some(data) = input::read_piped_stdin()? {
        serde_json::from_value(data)?
    } else {
        let raw_flows = args
            .cash_flows
            .as_deref()
            .ok_or("--cash-flows is required (or provide --input)")?;
        BreakevenRequest {
            cash_flows: super::parse_decimal_list(raw_flows)?,
            initial_investment: args.initial_investment,
            first_period_capex: args.capex,
            low: args.low,
            high: args.high,
        }
    };

    let initial_investment = super::resolve_initial_investment(
        request.initial_investment,
        request.first_period_capex,
    )?;

    let result = sensitivity::find_breakeven_rate(
        &request.cash_flows,
        initial_investment,
        request.low,
        request.high,
    )?;
    Ok(serde_json::to_value(result)?)
}

/// Parse a min:max:step rate range (e.g. "0.06:0.15:0.01").
fn parse_rate_range(spec: &str) -> Result<(Decimal, Decimal, Decimal), Box<dyn std::error::Error>> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 3 {
        return Err(format!("Rate range must be min:max:step, got '{spec}'").into());
    }
    Ok((parts[0].parse()?, parts[1].parse()?, parts[2].parse()?))
}
