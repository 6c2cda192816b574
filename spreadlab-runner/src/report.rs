//! Run artifact export (CSV/JSON).
//!
//! CSV rows flatten the two list-valued trade fields: strikes become a
//! semicolon-joined `short;long` pair and breach minutes a semicolon-joined
//! timestamp list, matching the historical ledger format.

use anyhow::{Context, Result};
use serde::Serialize;
use spreadlab_core::domain::Trade;
use std::path::Path;

use crate::analyzer::RunSummary;

#[derive(Debug, Serialize)]
struct TradeRow<'a> {
    strategy: &'a str,
    spread_type: String,
    strikes: String,
    width: f64,
    offset: f64,
    stop_loss: String,
    take_profit_level: f64,
    entry_time: String,
    entry_price: f64,
    exit_time: String,
    exit_price: f64,
    max_loss: f64,
    max_profit: f64,
    break_even_level: f64,
    break_even_time: String,
    break_even_times: String,
    pnl: f64,
    outcome: String,
    status: String,
}

impl<'a> From<&'a Trade> for TradeRow<'a> {
    fn from(trade: &'a Trade) -> Self {
        TradeRow {
            strategy: &trade.strategy,
            spread_type: trade.spread_type.to_string(),
            strikes: format!("{};{}", trade.strikes.0, trade.strikes.1),
            width: trade.width,
            offset: trade.offset,
            stop_loss: trade.stop_loss_policy.to_string(),
            take_profit_level: trade.take_profit_level,
            entry_time: trade.entry_time.to_string(),
            entry_price: trade.entry_price,
            exit_time: trade.exit_time.to_string(),
            exit_price: trade.exit_price,
            max_loss: trade.max_loss,
            max_profit: trade.max_profit,
            break_even_level: trade.break_even_level,
            break_even_time: trade
                .break_even_time
                .map(|t| t.to_string())
                .unwrap_or_default(),
            break_even_times: trade
                .break_even_times
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(";"),
            pnl: trade.pnl,
            outcome: trade.outcome.to_string(),
            status: trade.status.to_string(),
        }
    }
}

pub fn write_trades_csv(path: &Path, trades: &[Trade]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create trades CSV {}", path.display()))?;
    for trade in trades {
        writer.serialize(TradeRow::from(trade))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_trades_json(path: &Path, trades: &[Trade]) -> Result<()> {
    let json = serde_json::to_string_pretty(trades).context("failed to serialize trades")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write trades JSON {}", path.display()))?;
    Ok(())
}

pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("failed to serialize summary")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write summary JSON {}", path.display()))?;
    Ok(())
}

pub fn write_diagnostics(path: &Path, diagnostics: &[String]) -> Result<()> {
    std::fs::write(path, diagnostics.join("\n"))
        .with_context(|| format!("failed to write diagnostics {}", path.display()))?;
    Ok(())
}
