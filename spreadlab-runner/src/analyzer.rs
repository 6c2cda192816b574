//! Run statistics — pure functions over the closed trade ledger.
//!
//! Every figure is computed from the trade list and the starting balance;
//! nothing here touches the feed or the simulator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use spreadlab_core::domain::{SpreadType, Trade};
use std::collections::BTreeMap;

/// Aggregate statistics for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub overall: OverallStats,
    pub per_spread_type: Vec<SpreadTypeStats>,
    pub daily_pnl: Vec<DailyPnl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallStats {
    pub total_trades: usize,
    /// Fraction of trades with positive PnL.
    pub win_rate: f64,
    pub total_profit: f64,
    pub avg_pnl: f64,
    pub starting_balance: f64,
    pub final_balance: f64,
    /// Return on the starting balance, as a fraction.
    pub roi: f64,
    pub sharpe_ratio: f64,
    /// Largest peak-to-trough balance drop, in ledger currency (<= 0).
    pub max_drawdown: f64,
    /// Same drop as a fraction of the peak (<= 0).
    pub max_drawdown_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadTypeStats {
    pub spread_type: SpreadType,
    pub num_trades: usize,
    pub win_rate: f64,
    pub total_profit: f64,
    pub avg_pnl: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DailyPnl {
    pub date: NaiveDate,
    pub pnl: f64,
    /// Balance at the end of the day.
    pub balance: f64,
}

/// Compute all statistics from the closed ledger.
pub fn summarize(trades: &[Trade], starting_balance: f64) -> RunSummary {
    let daily = daily_pnl(trades, starting_balance);
    let balances: Vec<f64> = std::iter::once(starting_balance)
        .chain(daily.iter().map(|d| d.balance))
        .collect();

    let total_profit = trades.iter().map(|t| t.pnl).sum::<f64>();
    let (dd, dd_pct) = max_drawdown(&balances);

    let overall = OverallStats {
        total_trades: trades.len(),
        win_rate: win_rate(trades),
        total_profit,
        avg_pnl: avg_pnl(trades),
        starting_balance,
        final_balance: starting_balance + total_profit,
        roi: if starting_balance > 0.0 {
            total_profit / starting_balance
        } else {
            0.0
        },
        sharpe_ratio: sharpe_ratio(&balances),
        max_drawdown: dd,
        max_drawdown_pct: dd_pct,
    };

    RunSummary {
        overall,
        per_spread_type: spread_type_stats(trades),
        daily_pnl: daily,
    }
}

// ─── Individual statistic functions ─────────────────────────────────

/// Fraction of trades with positive PnL; 0.0 for an empty ledger.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().filter(|t| t.is_winner()).count() as f64 / trades.len() as f64
}

pub fn avg_pnl(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().map(|t| t.pnl).sum::<f64>() / trades.len() as f64
}

/// Per-day PnL and running balance, in date order.
pub fn daily_pnl(trades: &[Trade], starting_balance: f64) -> Vec<DailyPnl> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for trade in trades {
        *by_day.entry(trade.entry_time.date()).or_insert(0.0) += trade.pnl;
    }

    let mut balance = starting_balance;
    by_day
        .into_iter()
        .map(|(date, pnl)| {
            balance += pnl;
            DailyPnl {
                date,
                pnl,
                balance,
            }
        })
        .collect()
}

/// Annualized Sharpe ratio from the daily balance curve.
///
/// Sharpe = mean(daily returns) / std(daily returns) * sqrt(252).
/// Returns 0.0 for fewer than 2 days or zero variance.
pub fn sharpe_ratio(balances: &[f64]) -> f64 {
    if balances.len() < 3 {
        return 0.0;
    }
    let returns: Vec<f64> = balances
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect();
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
    let std = var.sqrt();
    if std < 1e-15 {
        return 0.0;
    }
    (mean / std) * (252.0_f64).sqrt()
}

/// Maximum drawdown of the balance curve: (dollars, fraction of peak).
/// Both are non-positive; 0.0 for a monotonic curve.
pub fn max_drawdown(balances: &[f64]) -> (f64, f64) {
    let mut peak = f64::MIN;
    let mut worst = 0.0_f64;
    let mut worst_pct = 0.0_f64;
    for &balance in balances {
        peak = peak.max(balance);
        let drop = balance - peak;
        if drop < worst {
            worst = drop;
            worst_pct = if peak > 0.0 { drop / peak } else { 0.0 };
        }
    }
    (worst, worst_pct)
}

fn spread_type_stats(trades: &[Trade]) -> Vec<SpreadTypeStats> {
    [SpreadType::PutSpread, SpreadType::CallSpread]
        .into_iter()
        .filter_map(|spread_type| {
            let side: Vec<&Trade> = trades
                .iter()
                .filter(|t| t.spread_type == spread_type)
                .collect();
            if side.is_empty() {
                return None;
            }
            let total: f64 = side.iter().map(|t| t.pnl).sum();
            Some(SpreadTypeStats {
                spread_type,
                num_trades: side.len(),
                win_rate: side.iter().filter(|t| t.is_winner()).count() as f64
                    / side.len() as f64,
                total_profit: total,
                avg_pnl: total / side.len() as f64,
            })
        })
        .collect()
}
