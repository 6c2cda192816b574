//! Per-strategy state prepared once per run.

use crate::config::StrategyConfig;
use crate::data::{FeedError, PriceFeed};
use crate::domain::StrategyId;
use crate::hedge::HedgeRequest;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// A strategy plus its precomputed entry candidates.
///
/// Candidates come from one windowed, condition-filtered query over the
/// whole run range; the minute loop then only does map lookups.
#[derive(Debug, Clone)]
pub struct StrategyRuntime {
    pub config: StrategyConfig,
    entries: BTreeMap<NaiveDateTime, f64>,
}

impl StrategyRuntime {
    pub fn prepare(
        config: StrategyConfig,
        feed: &dyn PriceFeed,
        start_date: chrono::NaiveDate,
        end_date: chrono::NaiveDate,
    ) -> Result<Self, FeedError> {
        let series = feed.underlying_series(
            start_date,
            end_date,
            config.window_start,
            config.window_end,
            &config.conditions,
        )?;
        let entries = series
            .into_iter()
            .map(|tick| (tick.timestamp, tick.price))
            .collect();
        Ok(Self { config, entries })
    }

    /// Underlying price if `now` is an entry candidate for this strategy.
    pub fn entry_price_at(&self, now: NaiveDateTime) -> Option<f64> {
        self.entries.get(&now).copied()
    }

    pub fn candidate_count(&self) -> usize {
        self.entries.len()
    }
}

/// A hedge planned at primary open time, waiting for its entry minute.
#[derive(Debug, Clone, Copy)]
pub struct PendingHedge {
    pub request: HedgeRequest,
    /// Strategy whose capacity the hedge is charged against.
    pub strategy: StrategyId,
}
