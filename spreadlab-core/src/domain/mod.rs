//! Domain types for SpreadLab

pub mod ids;
pub mod trade;

pub use ids::{StrategyId, TradeId};
pub use trade::{Outcome, SpreadType, StopLossPolicy, Trade, TradeStatus};
