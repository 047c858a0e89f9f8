use clap::Args;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use capval_core::valuation::capm;
use capval_core::valuation::dcf;
use capval_core::valuation::wacc::{self, CapitalStructureInput};

use crate::input;

/// Arguments for the WACC calculation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct WaccArgs {
    /// Cost of equity (e.g. 0.145 for 14.5%)
    #[arg(long, alias = "ke")]
    pub cost_of_equity: Option<Decimal>,

    /// Pre-tax cost of debt
    #[arg(long, alias = "kd")]
    pub cost_of_debt: Option<Decimal>,

    /// Marginal corporate tax rate
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    /// Debt share of the target capital structure (0..1)
    #[arg(long)]
    pub target_debt: Option<Decimal>,

    /// Debt share of the current capital structure (default: all-equity)
    #[arg(long)]
    pub current_debt: Option<Decimal>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for discounting a cash-flow series
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct NpvArgs {
    /// Per-period FCFF values as a comma list (e.g. "10,20,30")
    #[arg(long)]
    pub cash_flows: Option<String>,

    /// Discount rate (e.g. 0.10 for 10%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Up-front outlay subtracted from the discounted total
    #[arg(long)]
    pub initial_investment: Option<Decimal>,

    /// First-period capex; applies the 1.5x estimate when no
    /// --initial-investment is given
    #[arg(long)]
    pub capex: Option<Decimal>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for Hamada beta relevering
#[derive(Args)]
pub struct ReleverArgs {
    /// Unlevered (asset) beta
    #[arg(long)]
    pub unlevered_beta: Decimal,

    /// Marginal corporate tax rate
    #[arg(long)]
    pub tax_rate: Decimal,

    /// Debt share of the target capital structure (0..1); converted to D/E
    #[arg(long, conflicts_with = "debt_equity")]
    pub target_debt: Option<Decimal>,

    /// Target debt-to-equity ratio, if already known
    #[arg(long)]
    pub debt_equity: Option<Decimal>,

    /// Risk-free rate; with --erp, also reports the CAPM cost of equity
    #[arg(long)]
    pub risk_free_rate: Option<Decimal>,

    /// Equity risk premium
    #[arg(long)]
    pub erp: Option<Decimal>,
}

/// JSON request body for `capval npv`.
#[derive(Debug, Deserialize)]
struct NpvRequest {
    cash_flows: Vec<Decimal>,
    rate: Decimal,
    #[serde(default)]
    initial_investment: Option<Decimal>,
    #[serde(default)]
    first_period_capex: Option<Decimal>,
}

#[derive(Debug, Serialize)]
struct ReleverOutput {
    unlevered_beta: Decimal,
    debt_equity: Decimal,
    levered_beta: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    cost_of_equity: Option<Decimal>,
}

pub fn run_wacc(args: WaccArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input: CapitalStructureInput = if let Some(ref path) = args.input {
        input::read_json(path)?
    } else if let Some(data) = input::read_piped_stdin()? {
        serde_json::from_value(data)?
    } else {
        CapitalStructureInput {
            cost_of_equity: args
                .cost_of_equity
                .ok_or("--cost-of-equity is required (or provide --input)")?,
            cost_of_debt_pretax: args
                .cost_of_debt
                .ok_or("--cost-of-debt is required (or provide --input)")?,
            tax_rate: args
                .tax_rate
                .ok_or("--tax-rate is required (or provide --input)")?,
            target_debt_fraction: args
                .target_debt
                .ok_or("--target-debt is required (or provide --input)")?,
            current_debt_fraction: args.current_debt.unwrap_or(Decimal::ZERO),
        }
    };

    let result = wacc::compute_cost_of_capital(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_npv(args: NpvArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (cash_flows, rate, initial_investment) = resolve_npv_request(&args)?;
    let result = dcf::discount_cash_flows(&cash_flows, rate, initial_investment)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_relever(args: ReleverArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let debt_equity = match (args.debt_equity, args.target_debt) {
        (Some(de), _) => de,
        (None, Some(fraction)) => capm::debt_fraction_to_debt_equity(fraction)?,
        (None, None) => return Err("--target-debt or --debt-equity is required".into()),
    };

    let levered_beta = capm::relever_beta(args.unlevered_beta, args.tax_rate, debt_equity);

    let cost_of_equity = match (args.risk_free_rate, args.erp) {
        (Some(rf), Some(erp)) => Some(capm::cost_of_equity_capm(rf, levered_beta, erp)),
        _ => None,
    };

    let output = ReleverOutput {
        unlevered_beta: args.unlevered_beta,
        debt_equity,
        levered_beta,
        cost_of_equity,
    };
    Ok(serde_json::to_value(output)?)
}

/// Resolve cash flows, rate, and investment from file, stdin, or flags.
fn resolve_npv_request(
    args: &NpvArgs,
) -> Result<(Vec<Decimal>, Decimal, Decimal), Box<dyn std::error::Error>> {
    let request: NpvRequest = if let Some(ref path) = args.input {
        input::read_json(path)?
    } else if let Some(data) = input::read_piped_stdin()? {
        serde_json::from_value(data)?
    } else {
        let raw_flows = args
            .cash_flows
            .as_deref()
            .ok_or("--cash-flows is required (or provide --input)")?;
        NpvRequest {
            cash_flows: super::parse_decimal_list(raw_flows)?,
            rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            initial_investment: args.initial_investment,
            first_period_capex: args.capex,
        }
    };

    let initial_investment = super::resolve_initial_investment(
        request.initial_investment,
        request.first_period_capex,
    )?;

    Ok((request.cash_flows, request.rate, initial_investment))
}
