//! Calibrate fund parameters against the minimum balance
//!
//! Runs the balancing search for every parameter in the requested scopes and
//! reports the value that brings the minimum balance to about zero.
//! Supports JSON output for API integration via --json flag

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use loan_fund::calibration::{
    Calibrator, CurrentBalanceState, Scope, SearchOutcome, TargetReport, DEFAULT_TOLERANCE,
};
use loan_fund::inputs::{FundConfig, DEFAULT_INPUTS_PATH};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScopeArg {
    New,
    Combined,
    All,
}

impl ScopeArg {
    fn includes(self, scope: Scope) -> bool {
        match self {
            ScopeArg::New => scope == Scope::NewOnly,
            ScopeArg::Combined => scope == Scope::Combined,
            ScopeArg::All => true,
        }
    }
}

#[derive(Parser)]
#[command(name = "calibrate", version, about = "Find balancing values for fund parameters")]
struct Cli {
    #[arg(long, default_value = DEFAULT_INPUTS_PATH)]
    inputs: PathBuf,

    /// Use the built-in default community instead of reading inputs
    #[arg(long, conflicts_with = "inputs")]
    defaults: bool,

    /// Which balance the searches target
    #[arg(long, value_enum, default_value = "all")]
    scope: ScopeArg,

    /// Accepted distance of the minimum balance from zero
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,

    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct CalibrationResponse {
    generated_at: DateTime<Utc>,
    tolerance: f64,
    balance_state: CurrentBalanceState,
    targets: Vec<TargetReport>,
    execution_time_ms: u64,
}

fn format_value(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.0}"))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    let config = if cli.defaults {
        FundConfig::default_community()
    } else {
        FundConfig::from_csv_path(&cli.inputs)
            .with_context(|| format!("loading inputs from {}", cli.inputs.display()))?
    };

    for (side, problem) in config.distribution_warnings() {
        log::warn!("{side} distribution: {problem}");
    }

    let calibrator = Calibrator::new(config).with_tolerance(cli.tolerance);
    let balance_state = calibrator.current_state();

    if !cli.json {
        println!("Running calibration searches...");
    }

    let targets: Vec<TargetReport> = calibrator
        .compute_all_targets()
        .context("calibration search failed")?
        .into_iter()
        .filter(|report| cli.scope.includes(report.scope))
        .collect();

    if cli.json {
        let response = CalibrationResponse {
            generated_at: Utc::now(),
            tolerance: cli.tolerance,
            balance_state,
            targets,
            execution_time_ms: start.elapsed().as_millis() as u64,
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("\nCurrent state:");
    println!("  Min balance (new families): {:.0}", balance_state.min_new);
    println!("  Min balance (existing):     {:.0}", balance_state.min_existing);
    println!("  Min balance (combined):     {:.0}", balance_state.min_combined);
    println!();

    println!(
        "{:<20} {:<10} {:>14} {:>14} {:>18} {:>9}",
        "Parameter", "Scope", "Current", "Target", "Current Min", "Balanced"
    );
    println!("{}", "-".repeat(90));
    for report in &targets {
        let target = match report.target {
            SearchOutcome::Found(v) => format!("{v:.0}"),
            SearchOutcome::Unreachable => "unreachable".to_string(),
        };
        let scope = match report.scope {
            Scope::NewOnly => "new",
            Scope::Combined => "combined",
        };
        println!(
            "{:<20} {:<10} {:>14} {:>14} {:>18.0} {:>9}",
            report.parameter.label(),
            scope,
            format_value(report.current_value),
            target,
            report.current_min_balance,
            if report.is_balanced { "yes" } else { "no" },
        );
    }

    println!("\nCompleted in {:?}", start.elapsed());
    Ok(())
}
