//! SpreadLab Runner — run orchestration on top of `spreadlab-core`.
//!
//! This crate provides:
//! - JSON run configuration with validation and content-addressed run ids
//! - Dataset loading into an in-memory feed
//! - Serial and per-day-parallel execution
//! - Run statistics (win rate, Sharpe, drawdown, per-side breakdown)
//! - Artifact export (trade ledger CSV/JSON, summary, diagnostics)

pub mod analyzer;
pub mod config;
pub mod data_loader;
pub mod report;
pub mod runner;

pub use analyzer::{summarize, DailyPnl, OverallStats, RunSummary, SpreadTypeStats};
pub use config::{ConfigError, RunFile, RunId, SimulationConfig, StrategySpec};
pub use data_loader::{build_feed, load_dataset, DatasetFile, LoadError};
pub use report::{write_diagnostics, write_summary_json, write_trades_csv, write_trades_json};
pub use runner::{run, run_parallel, RunError, RunOutcome};
