//! Trade — one modeled credit spread, from entry to resolved exit.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the market the spread sells into.
///
/// A put spread sells the higher strike and buys `width` points below it;
/// a call spread sells the lower strike and buys `width` points above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadType {
    PutSpread,
    CallSpread,
}

impl SpreadType {
    /// The side a box hedge is opened on.
    pub fn opposite(self) -> Self {
        match self {
            SpreadType::PutSpread => SpreadType::CallSpread,
            SpreadType::CallSpread => SpreadType::PutSpread,
        }
    }

    /// Wire/ledger name, matching the historical CSV format.
    pub fn as_str(self) -> &'static str {
        match self {
            SpreadType::PutSpread => "put_spread",
            SpreadType::CallSpread => "call_spread",
        }
    }
}

impl fmt::Display for SpreadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What closes a losing position: the break-even breach, or nothing short
/// of session expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopLossPolicy {
    /// Exit at the first minute the underlying crosses the break-even level.
    #[serde(rename = "bep")]
    BreakEven,
    /// Hold to expiry; break-even breaches are recorded but never exit.
    #[serde(rename = "expire")]
    Expire,
}

impl fmt::Display for StopLossPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopLossPolicy::BreakEven => f.write_str("bep"),
            StopLossPolicy::Expire => f.write_str("expire"),
        }
    }
}

/// How a trade's exit was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    TakeProfit,
    StopLoss,
    Expire,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::TakeProfit => f.write_str("take_profit"),
            Outcome::StopLoss => f.write_str("stop_loss"),
            Outcome::Expire => f.write_str("expire"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    Active,
    Closed,
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeStatus::Active => f.write_str("active"),
            TradeStatus::Closed => f.write_str("closed"),
        }
    }
}

/// A fully resolved credit-spread trade.
///
/// The builder resolves the entire price path at construction, so exit
/// fields are known up front; `status` flips to `Closed` when the simulator
/// clock reaches `exit_time`. A trade is mutated exactly once (that flip)
/// and never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub spread_type: SpreadType,
    pub width: f64,
    pub offset: f64,
    pub stop_loss_policy: StopLossPolicy,
    pub take_profit_level: f64,

    /// (short, long) — ordered pair, short leg first.
    pub strikes: (f64, f64),
    pub max_loss: f64,
    pub max_profit: f64,
    pub break_even_level: f64,
    /// First minute the underlying breached the break-even level, if any.
    pub break_even_time: Option<NaiveDateTime>,
    /// Every breach minute, for post-hoc analysis of the price path.
    pub break_even_times: Vec<NaiveDateTime>,

    pub entry_time: NaiveDateTime,
    /// Net credit at entry; negative by the sign convention of the ledger.
    pub entry_price: f64,
    pub exit_time: NaiveDateTime,
    pub exit_price: f64,
    pub pnl: f64,
    pub outcome: Outcome,
    pub status: TradeStatus,

    /// Label of the strategy that opened this trade (hedges carry the
    /// spawning strategy's label).
    pub strategy: String,
}

impl Trade {
    pub fn short_strike(&self) -> f64 {
        self.strikes.0
    }

    pub fn long_strike(&self) -> f64 {
        self.strikes.1
    }

    pub fn is_active(&self) -> bool {
        self.status == TradeStatus::Active
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    /// Strike ordering and width invariant for the spread's side.
    pub fn strikes_valid(&self) -> bool {
        let (short, long) = self.strikes;
        let ordered = match self.spread_type {
            SpreadType::PutSpread => short > long,
            SpreadType::CallSpread => short < long,
        };
        ordered && ((short - long).abs() - self.width).abs() < 1e-9
    }
}
