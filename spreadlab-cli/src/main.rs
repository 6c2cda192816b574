//! SpreadLab CLI — run and validate credit-spread simulations.
//!
//! Commands:
//! - `run` — execute a simulation from a JSON run file against a dataset
//! - `validate` — parse and validate a run file without executing it

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use spreadlab_runner::{load_dataset, RunFile, RunOutcome};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "spreadlab",
    about = "SpreadLab CLI — minute-resolution credit-spread simulator"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a simulation from a JSON run file.
    Run {
        /// Path to the JSON run file.
        #[arg(long)]
        config: PathBuf,

        /// Path to the JSON dataset file (underlying series + quotes).
        #[arg(long)]
        data: PathBuf,

        /// Output directory for run artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Fan session days out across worker threads.
        #[arg(long, default_value_t = false)]
        parallel: bool,
    },
    /// Parse and validate a run file without executing it.
    Validate {
        /// Path to the JSON run file.
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            data,
            output_dir,
            parallel,
        } => run_command(&config, &data, &output_dir, parallel),
        Commands::Validate { config } => validate_command(&config),
    }
}

fn run_command(config: &Path, data: &Path, output_dir: &Path, parallel: bool) -> Result<()> {
    let run_file = RunFile::from_path(config)
        .with_context(|| format!("loading run file {}", config.display()))?;
    let feed =
        load_dataset(data).with_context(|| format!("loading dataset {}", data.display()))?;

    let outcome = if parallel {
        spreadlab_runner::run_parallel(&run_file, &feed)?
    } else {
        spreadlab_runner::run(&run_file, &feed)?
    };

    write_artifacts(output_dir, &outcome)?;
    print_summary(&outcome);
    Ok(())
}

fn validate_command(config: &Path) -> Result<()> {
    let run_file = RunFile::from_path(config)
        .with_context(|| format!("loading run file {}", config.display()))?;
    let run_id = run_file.run_id()?;
    println!("OK: {} ({} strategies)", config.display(), run_file.strategies.len());
    println!("run id: {run_id}");
    Ok(())
}

fn write_artifacts(output_dir: &Path, outcome: &RunOutcome) -> Result<()> {
    let dir = output_dir.join(&outcome.run_id[..16]);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    spreadlab_runner::write_trades_csv(&dir.join("trades.csv"), &outcome.result.trades)?;
    spreadlab_runner::write_trades_json(&dir.join("trades.json"), &outcome.result.trades)?;
    spreadlab_runner::write_summary_json(&dir.join("summary.json"), &outcome.summary)?;
    if !outcome.result.diagnostics.is_empty() {
        spreadlab_runner::write_diagnostics(
            &dir.join("diagnostics.txt"),
            &outcome.result.diagnostics,
        )?;
    }

    println!("artifacts written to {}", dir.display());
    Ok(())
}

fn print_summary(outcome: &RunOutcome) {
    let overall = &outcome.summary.overall;

    println!("\nRun {}", outcome.run_id);
    println!("Days processed: {}", outcome.result.days_processed);
    println!("Trades: {}", overall.total_trades);
    println!("Starting balance: ${:.2}", overall.starting_balance);
    println!("Final balance: ${:.2}", overall.final_balance);
    println!(
        "Net profit/loss: ${:.2} ({:.2}%)",
        overall.total_profit,
        overall.roi * 100.0
    );
    println!("Win rate: {:.2}%", overall.win_rate * 100.0);
    println!("Sharpe: {:.2}", overall.sharpe_ratio);
    println!(
        "Max drawdown: ${:.2} ({:.2}%)",
        overall.max_drawdown,
        overall.max_drawdown_pct * 100.0
    );

    if !outcome.summary.per_spread_type.is_empty() {
        println!("\nStrategy breakdown:");
        for stats in &outcome.summary.per_spread_type {
            println!("{}:", stats.spread_type);
            println!("  Trades: {}", stats.num_trades);
            println!("  Win rate: {:.2}%", stats.win_rate * 100.0);
            println!("  Total profit: ${:.2}", stats.total_profit);
            println!("  Average PnL: ${:.2}", stats.avg_pnl);
        }
    }

    if !outcome.result.diagnostics.is_empty() {
        println!(
            "\n{} diagnostic message(s); see diagnostics.txt",
            outcome.result.diagnostics.len()
        );
    }
}
