//! Validated engine configuration.
//!
//! These are the types the simulator consumes. Parsing and validating the
//! JSON run file happens in the runner crate; by the time a
//! `StrategyConfig` reaches the core it is assumed well-formed.

use crate::domain::SpreadType;
use crate::pricing::QuoteInvalidationPolicy;
use crate::domain::trade::StopLossPolicy;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// When (if ever) to open an opposite-side box hedge for a primary trade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HedgePolicy {
    #[default]
    None,
    /// Hedge at the primary's break-even breach minute.
    #[serde(alias = "box")]
    BreakEvenBox,
    /// Hedge at the strategy's window-end time, if the primary is still open.
    TimeBox,
}

/// One strategy slot in a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Ledger label; also the key for capacity accounting diagnostics.
    pub name: String,
    pub spread_type: SpreadType,
    /// Opaque store-side entry condition expression ("" for none).
    pub conditions: String,
    /// Entry candidates are drawn from this time-of-day window.
    pub window_start: NaiveTime,
    pub window_end: NaiveTime,
    pub width: f64,
    pub offset: f64,
    pub stop_loss_policy: StopLossPolicy,
    pub take_profit_level: f64,
    pub max_active_positions: usize,
    pub hedge_policy: HedgePolicy,
}

/// Run-level simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub starting_balance: f64,
    /// Fixed per-fill price adjustment, in spread price points.
    pub slippage: f64,
    /// Fixed per-trade fee, in ledger currency.
    pub commission: f64,
    pub invalid_quote_policy: QuoteInvalidationPolicy,
}

impl SimulationSettings {
    /// Historical defaults: 0.05 slippage, 1.50 commission.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, starting_balance: f64) -> Self {
        Self {
            start_date,
            end_date,
            starting_balance,
            slippage: 0.05,
            commission: 1.5,
            invalid_quote_policy: QuoteInvalidationPolicy::default(),
        }
    }
}
