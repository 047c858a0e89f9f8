mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::sensitivity::{BreakevenArgs, SweepArgs};
use commands::valuation::{NpvArgs, ReleverArgs, WaccArgs};

/// Cost-of-capital and DCF valuation calculations
#[derive(Parser)]
#[command(
    name = "capval",
    version,
    about = "Cost-of-capital and DCF valuation calculations",
    long_about = "A CLI for pricing capital structures and discounting free-cash-flow \
                  series with decimal precision. Supports WACC what-ifs, NPV, \
                  rate-sensitivity sweeps, break-even search, and beta relevering."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate WACC at the current and target capital structures
    Wacc(WaccArgs),
    /// Discount a free-cash-flow series and report NPV
    Npv(NpvArgs),
    /// Sweep NPV across a range of discount rates
    Sweep(SweepArgs),
    /// Locate the break-even discount rate by bisection
    Breakeven(BreakevenArgs),
    /// Re-lever a beta to a target capital structure (Hamada)
    Relever(ReleverArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Wacc(args) => commands::valuation::run_wacc(args),
        Commands::Npv(args) => commands::valuation::run_npv(args),
        Commands::Sweep(args) => commands::sensitivity::run_sweep(args),
        Commands::Breakeven(args) => commands::sensitivity::run_breakeven(args),
        Commands::Relever(args) => commands::valuation::run_relever(args),
        Commands::Version => {
            println!("capval {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
