//! Loan Fund CLI
//!
//! Runs the combined projection for a set of inputs and prints the yearly table,
//! a summary and the current balance state. Supports JSON output via --json.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use loan_fund::calibration::{current_balance_state, CurrentBalanceState};
use loan_fund::inputs::{FundConfig, DEFAULT_INPUTS_PATH};
use loan_fund::projection::{display_window, CombinedYearRow, ProjectionEngine, ProjectionSummary};

#[derive(Parser)]
#[command(name = "loan_fund", version, about = "Project the yearly cash flow of a community loan fund")]
struct Cli {
    /// Directory holding existing_loans.csv, yearly_params.csv and optional distributions/settings
    #[arg(long, default_value = DEFAULT_INPUTS_PATH)]
    inputs: PathBuf,

    /// Use the built-in default community instead of reading inputs
    #[arg(long, conflicts_with = "inputs")]
    defaults: bool,

    /// First year shown (display only; the projection always covers the full horizon)
    #[arg(long)]
    from: Option<i32>,

    /// Last year shown
    #[arg(long)]
    to: Option<i32>,

    /// Emit a JSON report instead of tables
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct ProjectionReport<'a> {
    generated_at: DateTime<Utc>,
    start_year: i32,
    end_year: i32,
    initial_balance: f64,
    summary: &'a ProjectionSummary,
    balance_state: CurrentBalanceState,
    combined: Vec<&'a CombinedYearRow>,
    execution_time_ms: u64,
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

    let settings = &config.settings;
    let from = cli.from.unwrap_or(settings.start_year);
    let to = cli.to.unwrap_or(settings.end_year);

    let set = ProjectionEngine::new(&config).project();
    let summary = set.combined_summary();
    let state = current_balance_state(&config);
    let shown: Vec<&CombinedYearRow> = display_window(&set.combined, from, to).collect();

    if cli.json {
        let report = ProjectionReport {
            generated_at: Utc::now(),
            start_year: settings.start_year,
            end_year: settings.end_year,
            initial_balance: settings.initial_balance,
            summary: &summary,
            balance_state: state,
            combined: shown,
            execution_time_ms: start.elapsed().as_millis() as u64,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Loan Fund Projection {}-{}", settings.start_year, settings.end_year);
    println!("=================================\n");
    println!("Initial balance: {:.0}", settings.initial_balance);
    println!();

    println!(
        "{:>6} {:>10} {:>12} {:>14} {:>14} {:>14} {:>14} {:>16}",
        "Year", "Joiners", "Loans", "Loans Out", "Repayments", "Fees", "Net", "Balance"
    );
    println!("{}", "-".repeat(106));
    for row in &shown {
        println!(
            "{:>6} {:>10.1} {:>12.2} {:>14.0} {:>14.0} {:>14.0} {:>14.0} {:>16.0}",
            row.year,
            row.new_joiners,
            row.total.loans_given_count,
            row.total.loans_given_amount,
            row.total.loan_repayments,
            row.total.fees,
            row.total.net,
            row.running_balance,
        );
    }

    println!("\nSummary:");
    println!("  Years projected:   {}", summary.total_years);
    println!("  Total money in:    {:.0}", summary.total_money_in);
    println!("  Total money out:   {:.0}", summary.total_money_out);
    println!("  Total loans given: {:.0}", summary.total_loans_given);
    println!("  Final balance:     {:.0}", summary.final_balance);
    match summary.min_balance_year {
        Some(year) => println!("  Minimum balance:   {:.0} ({year})", summary.min_balance),
        None => println!("  Minimum balance:   {:.0}", summary.min_balance),
    }
    if let Some(year) = summary.first_negative_year {
        println!("  First deficit:     {year}");
    }

    println!("\nBalance state:");
    println!(
        "  New families: min {:>16.0}  {}",
        state.min_new,
        if state.new_balanced { "balanced" } else { "deficit" }
    );
    println!("  Existing:     min {:>16.0}", state.min_existing);
    println!(
        "  Combined:     min {:>16.0}  {}",
        state.min_combined,
        if state.combined_balanced { "balanced" } else { "deficit" }
    );

    println!("\nCompleted in {:?}", start.elapsed());
    Ok(())
}
